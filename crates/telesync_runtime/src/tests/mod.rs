mod refresh;
mod support;
mod service;
