/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 端到端：训练一个线性softmax分类器区分两团二维点
 */
use only_net::nn::{GraphOptions, LayerSpec, LossOptions, Network, NetworkOptions, Var};
use only_net::tensor::Tensor;

/// 两团线性可分的点及其one-hot标签
fn blobs() -> (Tensor, Tensor) {
    let offsets = [(0.0, 0.0), (0.3, -0.2), (-0.25, 0.1), (0.1, 0.35), (-0.3, -0.3)];
    let mut points = Vec::new();
    let mut labels = Vec::new();
    for (center, label) in [((-1.0, -1.0), [1.0, 0.0]), ((1.0, 1.0), [0.0, 1.0])] {
        for (dx, dy) in offsets {
            points.extend([center.0 + dx, center.1 + dy]);
            labels.extend(label);
        }
    }
    let n = offsets.len() * 2;
    (Tensor::new(&points, &[n, 2]), Tensor::new(&labels, &[n, 2]))
}

#[test]
fn test_classifier_learns_blobs() {
    let _ = env_logger::builder().is_test(true).try_init();
    let net = Network::classifier(
        NetworkOptions::new(vec![LayerSpec::Size(2), LayerSpec::Size(2)]).with_seed(3),
    )
    .unwrap();
    let loss_options = LossOptions::from(GraphOptions::default());
    let loss = net.loss(&loss_options).unwrap();
    let graph = net.graph();
    let params = net.params();
    let grads = graph.grad(&loss.loss, &params).unwrap();
    let updates: Vec<(Var, Var)> = params
        .iter()
        .zip(&grads)
        .map(|(p, g)| (p.clone(), p - &g.scale(0.5)))
        .collect();
    let train = graph.function(&net.inputs(), &[loss.loss.clone()], &updates).unwrap();

    let (x, t) = blobs();
    for _ in 0..100 {
        train.call(&[&x, &t]).unwrap();
    }

    let values = net.evaluate(&[&x, &t], &loss_options).unwrap();
    let acc = values.iter().find(|(name, _)| name == "acc").unwrap().1;
    assert!(acc > 0.9, "准确率过低：{values:?}");

    let y = net.predict(&x).unwrap();
    for row in 0..y.rows() {
        let total = y.get(row, 0).unwrap() + y.get(row, 1).unwrap();
        approx::assert_abs_diff_eq!(total, 1.0, epsilon = 1e-5);
    }
}
