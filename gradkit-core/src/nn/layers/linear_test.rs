// src/nn/layers/linear_test.rs

use super::*;
use crate::error::GradKitError;
use crate::ops::reduction::sum_op;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn make_layer(in_features: usize, out_features: usize, seed: u64) -> Linear {
    let mut rng = StdRng::seed_from_u64(seed);
    Linear::new(in_features, out_features, &mut rng).unwrap()
}

#[test]
fn test_linear_creation() {
    let linear = make_layer(10, 5, 0);
    assert_eq!(linear.weight().shape(), vec![10, 5]);
    assert!(linear.weight().requires_grad());
    assert_eq!(linear.bias().shape(), vec![5]);
    assert!(linear.bias().requires_grad());
    assert_eq!(linear.in_features(), 10);
    assert_eq!(linear.out_features(), 5);
}

#[test]
fn test_linear_rejects_zero_features() {
    let mut rng = StdRng::seed_from_u64(0);
    assert!(matches!(
        Linear::new(0, 5, &mut rng),
        Err(GradKitError::InvalidConfig { .. })
    ));
}

#[test]
fn test_linear_parameters_order() {
    let linear = make_layer(3, 2, 0);
    let params = linear.parameters();
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].shape(), vec![3, 2]); // weight first
    assert_eq!(params[1].shape(), vec![2]); // then bias
}

#[test]
fn test_linear_forward_values() {
    let linear = make_layer(3, 2, 0);
    linear.weight().write_data().data = vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0];
    linear.bias().write_data().data = vec![0.1, 0.2];

    let input = Tensor::new(vec![10.0, 20.0, 30.0], vec![1, 3]).unwrap();
    let output = linear.forward(&input).unwrap();

    // x @ W = [10*1+20*2+30*3, 10*4+20*5+30*6] = [140, 320], then + bias.
    assert_eq!(output.shape(), vec![1, 2]);
    let data = output.data();
    assert!((data[0] - 140.1).abs() < 1e-4);
    assert!((data[1] - 320.2).abs() < 1e-4);
    assert!(output.requires_grad());
}

#[test]
fn test_linear_forward_batch_broadcasts_bias() {
    let linear = make_layer(3, 2, 0);
    linear.weight().write_data().data = vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
    linear.bias().write_data().data = vec![0.1, 0.2];

    let input = Tensor::new(vec![10.0, 20.0, 30.0, 1.0, 2.0, 3.0], vec![2, 3]).unwrap();
    let output = linear.forward(&input).unwrap();

    assert_eq!(output.shape(), vec![2, 2]);
    let data = output.data();
    let expected = [10.1f32, 20.2, 1.1, 2.2];
    for (got, want) in data.iter().zip(expected.iter()) {
        assert!((got - want).abs() < 1e-4, "got {got}, want {want}");
    }
}

#[test]
fn test_linear_forward_shape_mismatch() {
    let linear = make_layer(3, 2, 0);
    let bad_input = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![1, 4]).unwrap();
    assert!(matches!(
        linear.forward(&bad_input),
        Err(GradKitError::ShapeMismatch { .. })
    ));

    let not_2d = Tensor::new(vec![1.0, 2.0, 3.0], vec![3]).unwrap();
    assert!(matches!(
        linear.forward(&not_2d),
        Err(GradKitError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_linear_backward_populates_parameter_grads() {
    let linear = make_layer(2, 1, 0);
    linear.weight().write_data().data = vec![3.0, 4.0];
    linear.bias().write_data().data = vec![0.1];

    let input = Tensor::new(vec![10.0, 20.0], vec![1, 2]).unwrap();
    input.set_requires_grad(true);

    let output = linear.forward(&input).unwrap();
    let loss = sum_op(&output).unwrap();
    loss.backward(None).unwrap();

    let grad_input = input.grad().expect("input gradient missing");
    assert_eq!(grad_input.data(), vec![3.0, 4.0]);

    let grad_weight = linear.weight().grad().expect("weight gradient missing");
    assert_eq!(grad_weight.shape(), vec![2, 1]);
    assert_eq!(grad_weight.data(), vec![10.0, 20.0]);

    let grad_bias = linear.bias().grad().expect("bias gradient missing");
    assert_eq!(grad_bias.data(), vec![1.0]);
}

#[test]
fn test_linear_seeded_init_deterministic() {
    let a = make_layer(4, 3, 99);
    let b = make_layer(4, 3, 99);
    assert_eq!(a.weight().data(), b.weight().data());
    assert_eq!(a.bias().data(), b.bias().data());

    let c = make_layer(4, 3, 100);
    assert_ne!(a.weight().data(), c.weight().data());
}
