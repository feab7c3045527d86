mod common;
mod session_flow;
