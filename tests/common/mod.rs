//! Shared stub upstreams for integration tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use stability::{CallError, CallResult, Circuit, Context};

/// A stub upstream that counts invocations.
#[derive(Clone)]
pub struct Upstream {
    pub circuit: Circuit,
    calls: Arc<AtomicUsize>,
}

impl Upstream {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Always answers `body`.
pub fn healthy(body: &'static str) -> Upstream {
    programmable(move |_| Ok(body.to_string()))
}

/// Always fails with `message`.
#[allow(dead_code)]
pub fn failing(message: &'static str) -> Upstream {
    programmable(move |_| Err(CallError::upstream(message)))
}

/// Fails `failures` times, then succeeds with "success".
#[allow(dead_code)]
pub fn transient(failures: usize) -> Upstream {
    programmable(move |n| {
        if n <= failures {
            Err(CallError::upstream(format!("transient failure {}", n)))
        } else {
            Ok("success".to_string())
        }
    })
}

/// Replays `script` in order; the last entry repeats once the script runs out.
#[allow(dead_code)]
pub fn scripted(script: Vec<CallResult>) -> Upstream {
    let script = Arc::new(Mutex::new(VecDeque::from(script)));
    programmable(move |_| {
        let mut script = script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap()
        }
    })
}

/// Answers with `f(n)` where `n` is the 1-based invocation number.
pub fn programmable<F>(f: F) -> Upstream
where
    F: Fn(usize) -> CallResult + Send + Sync + 'static,
{
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let f = Arc::new(f);
    let circuit = Circuit::from_fn(move |_ctx: Context| {
        let counter = counter.clone();
        let f = f.clone();
        async move {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            f(n)
        }
    });
    Upstream { circuit, calls }
}
