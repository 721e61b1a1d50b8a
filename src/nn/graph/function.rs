/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : 编译后的函数：固定输入、输出与参数更新规则
 */

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::{GraphError, GraphInner, NodeId};
use crate::tensor::Tensor;

/// 由`Graph::function`编译得到。
///
/// 编译时一次性算好求值顺序，调用时只需按顺序喂入输入并计算；
/// 若带有更新规则`(参数, 新值表达式)`，则在所有输出算完后统一写回参数。
pub struct Function {
    graph: Rc<RefCell<GraphInner>>,
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
    updates: Vec<(NodeId, NodeId)>,
    schedule: Vec<NodeId>,
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("updates", &self.updates.len())
            .finish()
    }
}

impl Function {
    pub(crate) fn compile(
        graph: Rc<RefCell<GraphInner>>,
        inputs: Vec<NodeId>,
        outputs: Vec<NodeId>,
        updates: Vec<(NodeId, NodeId)>,
    ) -> Result<Self, GraphError> {
        let schedule = {
            let g = graph.borrow();
            for &id in &inputs {
                if !g.is_input_node(id)? {
                    return Err(GraphError::InvalidOperation(format!(
                        "`{}`不是输入节点，不能作为函数的输入",
                        g.get_node_name(id)?
                    )));
                }
            }
            for &(param, _) in &updates {
                if !g.is_parameter_node(param)? {
                    return Err(GraphError::InvalidOperation(format!(
                        "`{}`不是参数节点，不能被更新",
                        g.get_node_name(param)?
                    )));
                }
            }

            let targets: Vec<NodeId> = outputs
                .iter()
                .copied()
                .chain(updates.iter().map(|&(_, expr)| expr))
                .collect();
            let schedule = g.schedule(&targets)?;

            // 用到的输入必须都在参数列表里
            let provided: HashSet<NodeId> = inputs.iter().copied().collect();
            for &id in &schedule {
                if g.is_input_node(id)? && !provided.contains(&id) {
                    return Err(GraphError::MissingInput(g.get_node_name(id)?.to_string()));
                }
            }
            schedule
        };

        Ok(Self {
            graph,
            inputs,
            outputs,
            updates,
            schedule,
        })
    }

    /// 调用函数：`args`与编译时的输入一一对应
    pub fn call(&self, args: &[&Tensor]) -> Result<Vec<Tensor>, GraphError> {
        if args.len() != self.inputs.len() {
            return Err(GraphError::InvalidOperation(format!(
                "函数需要{}个输入，实际提供了{}个",
                self.inputs.len(),
                args.len()
            )));
        }
        let feeds: HashMap<NodeId, Tensor> = self
            .inputs
            .iter()
            .zip(args)
            .map(|(&id, &t)| (id, t.clone()))
            .collect();

        let mut g = self.graph.borrow_mut();
        let values = g.run(&self.schedule, &feeds)?;
        let fetch = |id: &NodeId| values.get(id).cloned().ok_or(GraphError::NodeNotFound(*id));

        let outputs = self.outputs.iter().map(fetch).collect::<Result<Vec<_>, _>>()?;
        for (param, expr) in &self.updates {
            g.set_parameter_value(*param, &fetch(expr)?)?;
        }
        Ok(outputs)
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    pub fn num_updates(&self) -> usize {
        self.updates.len()
    }
}
