use std::fmt::{self, Display};

/// 张量的二元运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    MatMul,
    Compare,
    BroadcastTo,
    SumTo,
}
impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operation_name = match self {
            Operator::Add => "相加",
            Operator::Sub => "相减",
            Operator::Mul => "相乘",
            Operator::Div => "相除",
            Operator::MatMul => "矩阵相乘",
            Operator::Compare => "逐元素比较",
            Operator::BroadcastTo => "广播",
            Operator::SumTo => "归约求和",
        };
        write!(f, "{}", operation_name)
    }
}
