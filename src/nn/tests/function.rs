/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 编译函数：输入校验、更新规则、随机节点的重新采样
 */

use approx::assert_abs_diff_eq;

use crate::assert_err;
use crate::nn::{Graph, GraphError, VarActivationOps, VarRandomOps, VarReduceOps};
use crate::tensor::Tensor;

/// 测试输出按调用前的参数值计算，更新在全部输出算完之后生效
#[test]
fn test_updates_apply_after_outputs() {
    let graph = Graph::new_with_seed(42);
    let p = graph.parameter("p", &Tensor::scalar(1.0)).unwrap();
    let q = graph.parameter("q", &Tensor::scalar(10.0)).unwrap();
    let next_p = &p + &graph.scalar(1.0);
    // q依赖旧的p，两个更新同时生效
    let next_q = &q + &p;
    let f = graph
        .function(&[], &[p.clone(), q.clone()], &[(p.clone(), next_p), (q.clone(), next_q)])
        .unwrap();
    assert_eq!(f.num_inputs(), 0);
    assert_eq!(f.num_outputs(), 2);
    assert_eq!(f.num_updates(), 2);

    let first = f.call(&[]).unwrap();
    assert_eq!(first[0].number(), Some(1.0));
    assert_eq!(first[1].number(), Some(10.0));
    assert_eq!(p.value().unwrap().number(), Some(2.0));
    assert_eq!(q.value().unwrap().number(), Some(11.0));

    let second = f.call(&[]).unwrap();
    assert_eq!(second[0].number(), Some(2.0));
    assert_eq!(second[1].number(), Some(11.0));
}

/// 测试一步梯度下降
#[test]
fn test_sgd_step() {
    let graph = Graph::new_with_seed(42);
    let x = graph.input("x");
    let w = graph.parameter("w", &Tensor::scalar(3.0)).unwrap();
    let cost = (&x * &w).sqr().sum();
    let grads = graph.grad(&cost, std::slice::from_ref(&w)).unwrap();
    let step = &w - &grads[0].scale(0.1);
    let f = graph.function(std::slice::from_ref(&x), &[cost], &[(w.clone(), step)]).unwrap();

    // cost = (x w)²，x = 1 时梯度为 2w = 6，新值为 3 - 0.6
    let out = f.call(&[&Tensor::scalar(1.0)]).unwrap();
    assert_abs_diff_eq!(out[0].number().unwrap(), 9.0, epsilon = 1e-6);
    assert_abs_diff_eq!(w.value().unwrap().number().unwrap(), 2.4, epsilon = 1e-6);
}

/// 测试编译时发现未列为输入的输入节点
#[test]
fn test_compile_rejects_unlisted_input() {
    let graph = Graph::new_with_seed(42);
    let x = graph.input("x");
    let y = graph.input("y");
    let result = graph.function(std::slice::from_ref(&x), &[(&x + &y).sum()], &[]);
    assert_err!(result, GraphError::MissingInput("y"));
}

/// 测试只有输入节点可作函数输入、只有参数可被更新
#[test]
fn test_compile_checks_node_kinds() {
    let graph = Graph::new_with_seed(42);
    let x = graph.input("x");
    let w = graph.parameter("w", &Tensor::scalar(1.0)).unwrap();
    let c = graph.scalar(2.0);

    assert_err!(
        graph.function(std::slice::from_ref(&w), &[w.clone()], &[]),
        GraphError::InvalidOperation(_)
    );
    assert_err!(
        graph.function(std::slice::from_ref(&x), &[x.clone()], &[(c.clone(), x.clone())]),
        GraphError::InvalidOperation(_)
    );
}

/// 测试调用时参数个数必须与输入个数一致
#[test]
fn test_call_checks_argument_count() {
    let graph = Graph::new_with_seed(42);
    let x = graph.input("x");
    let f = graph.function(std::slice::from_ref(&x), &[x.sum()], &[]).unwrap();
    assert_err!(f.call(&[]), GraphError::InvalidOperation(_));
    let out = f.call(&[&Tensor::ones(&[2, 2])]).unwrap();
    assert_eq!(out[0].number(), Some(4.0));
}

/// 测试噪声在每次调用时重新采样，且不加噪声时原样输出
#[test]
fn test_noise_resampled_per_call() {
    let graph = Graph::new_with_seed(7);
    let x = graph.input("x");
    let noisy = x.add_noise(1.0);
    let f = graph
        .function(std::slice::from_ref(&x), &[noisy, x.add_noise(0.0)], &[])
        .unwrap();

    let data = Tensor::zeros(&[4, 4]);
    let a = f.call(&[&data]).unwrap();
    let b = f.call(&[&data]).unwrap();
    assert_ne!(a[0], b[0]);
    assert_eq!(a[1], data);
}

/// 测试dropout只把元素置零、不做缩放
#[test]
fn test_dropout_masks_without_rescale() {
    let graph = Graph::new_with_seed(7);
    let x = graph.input("x");
    let f = graph
        .function(std::slice::from_ref(&x), &[x.dropout(0.5)], &[])
        .unwrap();
    let out = f.call(&[&Tensor::ones(&[8, 8])]).unwrap();
    assert!(out[0].to_vec().iter().all(|&v| v == 0.0 || v == 1.0));
}
