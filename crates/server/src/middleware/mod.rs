mod model_loaders;

pub use model_loaders::{ModelLoaderDeps, load_todo_middleware};
