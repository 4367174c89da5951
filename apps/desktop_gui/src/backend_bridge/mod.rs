//! Backend bridge: command queue types and the worker thread that runs the form controller.

pub mod commands;
pub mod runtime;
