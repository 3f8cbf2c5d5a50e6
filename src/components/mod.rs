pub mod frame_loop;
pub mod neural_graph;
pub mod particle_network;
pub mod surface;
