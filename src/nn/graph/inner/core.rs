use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::graph::GraphError;
use crate::nn::graph::node::{Node, Op};
use crate::tensor::Tensor;

impl GraphInner {
    /// 添加一个节点。未指定名称时按`{算子名}_{id}`自动命名
    pub(crate) fn add_node(&mut self, op: Op, name: Option<&str>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let name = name.map_or_else(|| format!("{}_{}", op.kind_name(), id.0), str::to_string);
        self.nodes.insert(
            id,
            Node {
                name,
                op,
                value: None,
            },
        );
        id
    }

    /// 新建输入占位节点（符号矩阵变量）
    pub fn new_input_node(&mut self, name: &str) -> NodeId {
        self.add_node(Op::Input, Some(name))
    }

    /// 新建参数节点。参数名在整张图内必须唯一
    pub fn new_parameter_node(&mut self, name: &str, value: &Tensor) -> Result<NodeId, GraphError> {
        let duplicated = self
            .nodes
            .values()
            .any(|n| matches!(n.op, Op::Parameter) && n.name == name);
        if duplicated {
            return Err(GraphError::DuplicateNodeName(name.to_string()));
        }
        let id = self.add_node(Op::Parameter, Some(name));
        if let Some(node) = self.nodes.get_mut(&id) {
            node.value = Some(value.clone());
        }
        Ok(id)
    }

    pub fn new_constant_node(&mut self, value: &Tensor) -> NodeId {
        self.add_node(Op::Constant(value.clone()), None)
    }

    pub(crate) fn get_node(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub fn get_node_name(&self, id: NodeId) -> Result<&str, GraphError> {
        Ok(&self.get_node(id)?.name)
    }

    pub fn is_input_node(&self, id: NodeId) -> Result<bool, GraphError> {
        Ok(matches!(self.get_node(id)?.op, Op::Input))
    }

    pub fn is_parameter_node(&self, id: NodeId) -> Result<bool, GraphError> {
        Ok(matches!(self.get_node(id)?.op, Op::Parameter))
    }

    /// 读取参数的当前值
    pub fn get_parameter_value(&self, id: NodeId) -> Result<&Tensor, GraphError> {
        let node = self.get_node(id)?;
        match (&node.op, &node.value) {
            (Op::Parameter, Some(value)) => Ok(value),
            _ => Err(GraphError::InvalidOperation(format!(
                "节点`{}`不是参数节点，没有可读取的值",
                node.name
            ))),
        }
    }

    /// 覆写参数值，新值形状必须与旧值一致
    pub fn set_parameter_value(&mut self, id: NodeId, value: &Tensor) -> Result<(), GraphError> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))?;
        match (&node.op, &mut node.value) {
            (Op::Parameter, Some(old)) => {
                if !old.is_same_shape(value) {
                    return Err(GraphError::ShapeMismatch {
                        expected: old.shape().to_vec(),
                        got: value.shape().to_vec(),
                        message: format!("参数`{}`的新值形状与原值不一致", node.name),
                    });
                }
                *old = value.clone();
                Ok(())
            }
            _ => Err(GraphError::InvalidOperation(format!(
                "节点`{}`不是参数节点，无法赋值",
                node.name
            ))),
        }
    }

    /// 图中所有参数节点（按创建顺序）
    pub fn get_parameter_nodes(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, n)| matches!(n.op, Op::Parameter))
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }
}
