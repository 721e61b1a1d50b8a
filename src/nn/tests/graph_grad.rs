/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 符号求导：梯度本身也是图上的节点，用前向求值验证其数值
 */

use approx::assert_abs_diff_eq;

use crate::nn::{Graph, VarActivationOps, VarMatrixOps, VarReduceOps};
use crate::tensor::{Axis, Tensor};

/// 测试`sum(x @ w)`对`w`的梯度为`xᵀ @ 1`
#[test]
fn test_grad_of_matmul() {
    let graph = Graph::new_with_seed(42);
    let x = graph.constant(&Tensor::new(&[1., 2., 3., 4.], &[2, 2]));
    let w = graph.parameter("w", &Tensor::new(&[0.5, -0.5], &[2, 1])).unwrap();
    let cost = x.matmul(&w).sum();

    let grads = graph.grad(&cost, &[w]).unwrap();
    let out = graph.evaluate(&grads, &[]).unwrap();
    assert_eq!(out[0], Tensor::new(&[4., 6.], &[2, 1]));
}

/// 测试被广播的操作数的梯度会被求和压回原形状
#[test]
fn test_grad_through_broadcast() {
    let graph = Graph::new_with_seed(42);
    let a = graph.parameter("a", &Tensor::zeros(&[2, 3])).unwrap();
    let b = graph.parameter("b", &Tensor::zeros(&[1, 3])).unwrap();
    let cost = (&a + &b).sum();

    let grads = graph.grad(&cost, &[a, b]).unwrap();
    let out = graph.evaluate(&grads, &[]).unwrap();
    assert_eq!(out[0], Tensor::ones(&[2, 3]));
    assert_eq!(out[1], Tensor::filled(2.0, &[1, 3]));
}

/// 测试逐元素乘法、平方与均值的链式求导
#[test]
fn test_grad_of_elementwise_chain() {
    let graph = Graph::new_with_seed(42);
    let a = graph.parameter("a", &Tensor::new(&[1., 2., 3., 4.], &[2, 2])).unwrap();
    let c = graph.constant(&Tensor::new(&[2., 2., 2., 2.], &[2, 2]));
    // mean((a * c)²) = mean(4a²)，梯度为 8a / 4 = 2a
    let cost = (&a * &c).sqr().mean();

    let grads = graph.grad(&cost, &[a]).unwrap();
    let out = graph.evaluate(&grads, &[]).unwrap();
    assert_abs_diff_eq!(
        out[0],
        Tensor::new(&[2., 4., 6., 8.], &[2, 2]),
        epsilon = 1e-5
    );
}

/// 测试sigmoid在0处的导数为0.25
#[test]
fn test_grad_of_sigmoid() {
    let graph = Graph::new_with_seed(42);
    let a = graph.parameter("a", &Tensor::zeros(&[1, 1])).unwrap();
    let grads = graph.grad(&a.sigmoid().sum(), &[a]).unwrap();
    let out = graph.evaluate(&grads, &[]).unwrap();
    assert_abs_diff_eq!(out[0].number().unwrap(), 0.25, epsilon = 1e-6);
}

/// 测试softmax各行之和恒为1，故其总和对输入的梯度为0
#[test]
fn test_grad_of_softmax_sum_is_zero() {
    let graph = Graph::new_with_seed(42);
    let a = graph
        .parameter("a", &Tensor::new(&[0.1, 1.2, -0.3, 2.0, 0.0, 0.5], &[2, 3]))
        .unwrap();
    let grads = graph.grad(&a.softmax().sum(), &[a]).unwrap();
    let out = graph.evaluate(&grads, &[]).unwrap();
    assert_abs_diff_eq!(out[0], Tensor::zeros(&[2, 3]), epsilon = 1e-5);
}

/// 测试与代价无关的变量得到形状相同的零梯度
#[test]
fn test_grad_of_unrelated_var_is_zero() {
    let graph = Graph::new_with_seed(42);
    let a = graph.parameter("a", &Tensor::ones(&[2, 2])).unwrap();
    let b = graph.parameter("b", &Tensor::ones(&[3, 1])).unwrap();
    let grads = graph.grad(&a.sum(), &[b]).unwrap();
    let out = graph.evaluate(&grads, &[]).unwrap();
    assert_eq!(out[0], Tensor::zeros(&[3, 1]));
}

/// 测试对输入变量求导（收缩正则所用的雅可比）
#[test]
fn test_grad_wrt_input() {
    let graph = Graph::new_with_seed(42);
    let x = graph.input("x");
    let w = graph.parameter("w", &Tensor::new(&[1., 2.], &[2, 1])).unwrap();
    let activity = x.matmul(&w).sigmoid().mean_axis(Axis::Rows).sum();

    let grads = graph.grad(&activity, std::slice::from_ref(&x)).unwrap();
    let data = Tensor::zeros(&[1, 2]);
    let out = graph.evaluate(&grads, &[(&x, &data)]).unwrap();
    // sigmoid'(0) * wᵀ
    assert_abs_diff_eq!(out[0], Tensor::new(&[0.25, 0.5], &[1, 2]), epsilon = 1e-6);
}

/// 测试梯度表达式可以再次求导
#[test]
fn test_second_order_grad() {
    let graph = Graph::new_with_seed(42);
    let a = graph.parameter("a", &Tensor::new(&[3.], &[1, 1])).unwrap();
    // d(a³)/da = 3a²，d(3a²)/da = 6a
    let cube = &a.sqr() * &a;
    let first = graph.grad(&cube.sum(), std::slice::from_ref(&a)).unwrap();
    let second = graph.grad(&first[0].sum(), &[a]).unwrap();
    let out = graph.evaluate(&[first[0].clone(), second[0].clone()], &[]).unwrap();
    assert_abs_diff_eq!(out[0].number().unwrap(), 27.0, epsilon = 1e-4);
    assert_abs_diff_eq!(out[1].number().unwrap(), 18.0, epsilon = 1e-4);
}
