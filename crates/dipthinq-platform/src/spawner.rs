use dipthinq_core::ports::{LocalTask, TaskSpawner};

/// Spawns onto the browser microtask queue with `spawn_local`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalSpawner;

impl TaskSpawner for LocalSpawner {
    fn spawn(&self, task: LocalTask) {
        wasm_bindgen_futures::spawn_local(task);
    }
}
