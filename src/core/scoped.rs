//! Thread-local scoped attributes
//!
//! Every logger owns a stack identity. Each thread keeps, per identity, a LIFO
//! stack of attribute frames pushed by [`ScopedAttributes`] guards. Records
//! opened on that thread see the frames in the filter view and get them merged
//! into their external set. A stack is only ever touched by the thread that
//! owns it, so no locking is involved.

use super::attribute::{AttributeSet, CombinedView};
use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_STACK_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_FRAME_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Token of a guard whose frame was never pushed
const INERT: u64 = 0;

#[derive(Default)]
struct FrameStack {
    frames: Vec<AttributeSet<'static>>,
    tokens: Vec<u64>,
}

impl FrameStack {
    fn release(&mut self, token: u64) {
        if let Some(pos) = self.tokens.iter().rposition(|&t| t == token) {
            let on_top = pos + 1 == self.tokens.len();
            self.tokens.remove(pos);
            self.frames.remove(pos);
            if !std::thread::panicking() {
                debug_assert!(on_top, "scoped attributes released out of order");
            }
        }
    }
}

/// One logger's stack on one thread
#[derive(Default)]
struct StackCell {
    stack: RefCell<FrameStack>,
    /// Tokens released while `stack` was borrowed for a filter view
    deferred: RefCell<Vec<u64>>,
}

impl StackCell {
    fn settle(&self) {
        let Ok(mut stack) = self.stack.try_borrow_mut() else {
            return;
        };
        for token in self.deferred.borrow_mut().drain(..) {
            stack.release(token);
        }
    }
}

type SharedStack = Rc<StackCell>;

thread_local! {
    // The map is only borrowed long enough to clone a stack handle out, so
    // filters and frontends may enter or drop scopes on any logger.
    static STACKS: RefCell<HashMap<u64, SharedStack>> = RefCell::new(HashMap::new());
}

fn stack_for(id: u64) -> Option<SharedStack> {
    STACKS
        .try_with(|stacks| stacks.borrow().get(&id).map(Rc::clone))
        .ok()
        .flatten()
}

/// Handle to one logger's per-thread stacks
#[derive(Debug)]
pub(crate) struct ScopedStack {
    id: AtomicU64,
}

impl ScopedStack {
    pub(crate) fn new() -> Self {
        Self {
            id: AtomicU64::new(NEXT_STACK_ID.fetch_add(1, Ordering::Relaxed)),
        }
    }

    fn id(&self) -> u64 {
        self.id.load(Ordering::Acquire)
    }

    /// Push a frame on the calling thread's stack
    ///
    /// A frame entered on a logger while that same logger's stack is being
    /// read (from inside its own filter) is not recorded; the returned guard
    /// is inert.
    pub(crate) fn enter(&self, attributes: AttributeSet<'_>) -> ScopedAttributes {
        let id = self.id();
        let token = NEXT_FRAME_TOKEN.fetch_add(1, Ordering::Relaxed);
        let frame = attributes.into_owned();

        let stack = STACKS
            .try_with(|stacks| Rc::clone(stacks.borrow_mut().entry(id).or_default()))
            .ok();
        let pushed = match stack.as_ref().map(|cell| cell.stack.try_borrow_mut()) {
            Some(Ok(mut stack)) => {
                stack.frames.push(frame);
                stack.tokens.push(token);
                true
            }
            Some(Err(_)) => {
                eprintln!("[LOGGER WARNING] Scoped attributes entered inside the same logger's filter are ignored");
                false
            }
            None => false,
        };
        if !pushed {
            drop(stack);
            prune(id);
        }

        ScopedAttributes {
            id,
            token: if pushed { token } else { INERT },
            _thread_bound: PhantomData,
        }
    }

    /// Run `f` over the active frames (bottom to top) chained with `external`
    pub(crate) fn with_view<R>(
        &self,
        external: &AttributeSet<'_>,
        f: impl FnOnce(&CombinedView<'_, '_>) -> R,
    ) -> R {
        let id = self.id();
        match stack_for(id) {
            Some(cell) => {
                let result = match cell.stack.try_borrow() {
                    Ok(stack) => f(&CombinedView::new(stack.frames.as_slice(), external)),
                    Err(_) => f(&CombinedView::new(&[], external)),
                };
                cell.settle();
                drop(cell);
                prune(id);
                result
            }
            // no frames, or thread-local storage already torn down
            None => f(&CombinedView::new(&[], external)),
        }
    }

    /// Append every active frame, in stack order, to `external`
    pub(crate) fn merge(&self, external: &mut AttributeSet<'_>) {
        if let Some(cell) = stack_for(self.id()) {
            if let Ok(stack) = cell.stack.try_borrow() {
                for frame in &stack.frames {
                    external.extend(frame.iter().cloned());
                }
            }
        }
    }

    /// Number of frames active on the calling thread
    pub(crate) fn depth(&self) -> usize {
        stack_for(self.id())
            .and_then(|cell| cell.stack.try_borrow().map(|stack| stack.frames.len()).ok())
            .unwrap_or(0)
    }

    /// Exchange stack identities; callers serialize this against readers.
    pub(crate) fn swap(&self, other: &ScopedStack) {
        let mine = self.id.load(Ordering::Acquire);
        let theirs = other.id.swap(mine, Ordering::AcqRel);
        self.id.store(theirs, Ordering::Release);
    }
}

/// Remove the map entry for `id` once its stack is empty and unused
fn prune(id: u64) {
    let _ = STACKS.try_with(|stacks| {
        let Ok(mut stacks) = stacks.try_borrow_mut() else {
            return;
        };
        let idle = stacks.get(&id).is_some_and(|cell| {
            Rc::strong_count(cell) == 1
                && cell.stack.try_borrow().is_ok_and(|stack| stack.frames.is_empty())
        });
        if idle {
            stacks.remove(&id);
        }
    });
}

/// Guard for one scoped attribute frame
///
/// Dropping the guard pops the frame, including during unwinding. Guards
/// must be released in reverse order of creation; releasing an outer guard
/// first trips a debug assertion and otherwise removes only its own frame.
/// The guard is bound to the thread that created it.
#[must_use = "scoped attributes are removed as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ScopedAttributes {
    id: u64,
    token: u64,
    _thread_bound: PhantomData<*const ()>,
}

impl Drop for ScopedAttributes {
    fn drop(&mut self) {
        if self.token == INERT {
            return;
        }
        let Some(cell) = stack_for(self.id) else {
            return;
        };
        match cell.stack.try_borrow_mut() {
            Ok(mut stack) => stack.release(self.token),
            // inside this logger's own filter; removed once the view ends
            Err(_) => {
                cell.deferred.borrow_mut().push(self.token);
                return;
            }
        }
        drop(cell);
        prune(self.id);
    }
}
