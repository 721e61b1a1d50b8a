mod function;
mod graph_grad;
mod layer_feedforward;
mod layer_registry;
mod network_cache;
