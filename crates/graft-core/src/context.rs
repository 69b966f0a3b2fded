//! Per-file execution state for one cycle of a recipe run.

use std::any::Any;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use crate::language::Language;
use crate::tree::{NodeId, SourceFile};
use crate::visitor::{ScopedVisitor, TreeVisitor, visit_file};

type AfterVisitKey = (String, Option<NodeId>);

/// A follow-up visitor requested while visiting a file.
pub struct AfterVisit {
    key: String,
    scope: Option<NodeId>,
    visitor: Box<dyn TreeVisitor>,
}

impl AfterVisit {
    /// Requests `visitor` over the whole file. Requests sharing `key` are
    /// deduplicated.
    #[must_use]
    pub fn new(key: impl Into<String>, visitor: Box<dyn TreeVisitor>) -> Self {
        Self {
            key: key.into(),
            scope: None,
            visitor,
        }
    }

    /// Requests `visitor` restricted to the subtree rooted at `scope`.
    #[must_use]
    pub fn scoped(key: impl Into<String>, scope: NodeId, visitor: Box<dyn TreeVisitor>) -> Self {
        Self {
            key: key.into(),
            scope: Some(scope),
            visitor,
        }
    }

    /// Returns the deduplication key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the node the request is scoped to, if any.
    #[must_use]
    pub const fn scope(&self) -> Option<NodeId> {
        self.scope
    }

    fn dedup_key(&self) -> AfterVisitKey {
        (self.key.clone(), self.scope)
    }
}

impl std::fmt::Debug for AfterVisit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AfterVisit")
            .field("key", &self.key)
            .field("scope", &self.scope)
            .field("visitor", &self.visitor.name())
            .finish()
    }
}

/// Mutable state threaded through every visitor run on one file in one
/// cycle.
///
/// Holds the follow-up queue (FIFO, deduplicated by key and scope), the
/// requests deferred to the next cycle, and warnings raised by edits that
/// were skipped.
pub struct ExecutionContext {
    cycle: usize,
    path: Utf8PathBuf,
    language: Language,
    queue: VecDeque<AfterVisit>,
    queued: HashSet<AfterVisitKey>,
    executed: HashSet<AfterVisitKey>,
    deferred: Vec<AfterVisit>,
    deferred_keys: HashSet<AfterVisitKey>,
    warnings: Vec<String>,
    messages: HashMap<String, Box<dyn Any + Send>>,
}

impl ExecutionContext {
    /// Creates the context for editing `file` during `cycle` (one-based).
    #[must_use]
    pub fn for_file(file: &SourceFile, cycle: usize) -> Self {
        Self {
            cycle,
            path: file.path().to_owned(),
            language: file.language(),
            queue: VecDeque::new(),
            queued: HashSet::new(),
            executed: HashSet::new(),
            deferred: Vec::new(),
            deferred_keys: HashSet::new(),
            warnings: Vec::new(),
            messages: HashMap::new(),
        }
    }

    /// Returns the current cycle, starting at one.
    #[must_use]
    pub const fn cycle(&self) -> usize {
        self.cycle
    }

    /// Returns the path of the file being edited.
    #[must_use]
    pub fn source_path(&self) -> &Utf8Path {
        &self.path
    }

    /// Returns the language of the file being edited.
    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Schedules a follow-up visitor.
    ///
    /// A request already waiting in the queue is dropped. A request that
    /// already ran in this cycle is deferred to the next one. Returns whether
    /// the request was queued for this cycle.
    pub fn do_after_visit(&mut self, request: AfterVisit) -> bool {
        let key = request.dedup_key();
        if self.queued.contains(&key) {
            return false;
        }
        if self.executed.contains(&key) {
            if self.deferred_keys.insert(key) {
                debug!(key = request.key(), "deferring follow-up visitor to next cycle");
                self.deferred.push(request);
            }
            return false;
        }
        self.queued.insert(key);
        self.queue.push_back(request);
        true
    }

    /// Returns the number of follow-up visitors waiting in this cycle.
    #[must_use]
    pub fn pending_after_visits(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether any follow-up was deferred to the next cycle.
    #[must_use]
    pub fn has_deferred(&self) -> bool {
        !self.deferred.is_empty()
    }

    /// Runs queued follow-up visitors in FIFO order until the queue is empty,
    /// including any they enqueue themselves.
    ///
    /// Scoped requests whose scope node is no longer in the tree are dropped.
    pub fn drain_after_visits(&mut self, file: &Arc<SourceFile>) -> Arc<SourceFile> {
        let mut current = Arc::clone(file);
        while let Some(request) = self.queue.pop_front() {
            let dedup = request.dedup_key();
            self.queued.remove(&dedup);
            self.executed.insert(dedup);

            let AfterVisit {
                key,
                scope,
                visitor,
            } = request;
            let mut visitor: Box<dyn TreeVisitor> = match scope {
                Some(id) if !current.root().contains(id) => {
                    debug!(key = %key, "dropping follow-up visitor whose scope was removed");
                    continue;
                }
                Some(id) => Box::new(ScopedVisitor::new(id, visitor)),
                None => visitor,
            };
            if !visitor.is_acceptable(&current, self) {
                continue;
            }
            current = visit_file(visitor.as_mut(), &current, self);
        }
        current
    }

    /// Moves deferred requests out of the context.
    pub fn take_deferred(&mut self) -> Vec<AfterVisit> {
        self.deferred_keys.clear();
        std::mem::take(&mut self.deferred)
    }

    /// Queues requests carried over from the previous cycle.
    pub fn resume(&mut self, carried: Vec<AfterVisit>) {
        for request in carried {
            self.do_after_visit(request);
        }
    }

    /// Records a non-fatal warning for the file.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(path = %self.path, %message, "edit skipped with warning");
        self.warnings.push(message);
    }

    /// Returns the warnings recorded so far.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Moves the recorded warnings out of the context.
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    /// Stores a value for the rest of this file's cycle.
    pub fn put_message<T: Any + Send>(&mut self, key: impl Into<String>, value: T) {
        self.messages.insert(key.into(), Box::new(value));
    }

    /// Returns a copy of a stored value.
    #[must_use]
    pub fn message<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.messages
            .get(key)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("cycle", &self.cycle)
            .field("path", &self.path)
            .field("queue", &self.queue)
            .field("deferred", &self.deferred)
            .field("warnings", &self.warnings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::cursor::Cursor;
    use crate::tree::Node;
    use crate::visitor::walk_children;

    fn file() -> Arc<SourceFile> {
        let token = Arc::new(Node::token("identifier", "a"));
        let root = Arc::new(Node::branch("program", vec![token]));
        Arc::new(SourceFile::new("A.java", Language::Java, root, ""))
    }

    struct Append {
        suffix: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl TreeVisitor for Append {
        fn visit(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
            let node = walk_children(self, cursor, ctx);
            match node.text() {
                Some(text) => {
                    self.log.lock().expect("log").push(self.suffix);
                    Arc::new(node.with_text(format!("{text}{}", self.suffix)))
                }
                None => node,
            }
        }
    }

    fn append(suffix: &'static str, log: &Arc<Mutex<Vec<&'static str>>>) -> Box<dyn TreeVisitor> {
        Box::new(Append {
            suffix,
            log: Arc::clone(log),
        })
    }

    #[test]
    fn runs_follow_ups_in_fifo_order() {
        let source = file();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut ctx = ExecutionContext::for_file(&source, 1);
        assert!(ctx.do_after_visit(AfterVisit::new("b", append("b", &log))));
        assert!(ctx.do_after_visit(AfterVisit::new("c", append("c", &log))));

        let out = ctx.drain_after_visits(&source);
        assert_eq!(out.print(), "abc");
        assert_eq!(*log.lock().expect("log"), vec!["b", "c"]);
    }

    #[test]
    fn drops_duplicate_pending_requests() {
        let source = file();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut ctx = ExecutionContext::for_file(&source, 1);
        assert!(ctx.do_after_visit(AfterVisit::new("b", append("b", &log))));
        assert!(!ctx.do_after_visit(AfterVisit::new("b", append("b", &log))));
        assert_eq!(ctx.pending_after_visits(), 1);

        let out = ctx.drain_after_visits(&source);
        assert_eq!(out.print(), "ab");
    }

    #[test]
    fn defers_requests_that_already_ran() {
        let source = file();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut ctx = ExecutionContext::for_file(&source, 1);
        ctx.do_after_visit(AfterVisit::new("b", append("b", &log)));
        let out = ctx.drain_after_visits(&source);

        assert!(!ctx.do_after_visit(AfterVisit::new("b", append("b", &log))));
        assert!(ctx.has_deferred());
        let carried = ctx.take_deferred();
        assert_eq!(carried.len(), 1);

        let mut next = ExecutionContext::for_file(&out, 2);
        next.resume(carried);
        assert_eq!(next.drain_after_visits(&out).print(), "abb");
    }

    #[test]
    fn drops_scoped_requests_for_removed_nodes() {
        let source = file();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut ctx = ExecutionContext::for_file(&source, 1);
        ctx.do_after_visit(AfterVisit::scoped("b", NodeId::fresh(), append("b", &log)));

        let out = ctx.drain_after_visits(&source);
        assert!(Arc::ptr_eq(&out, &source));
        assert!(log.lock().expect("log").is_empty());
    }

    #[test]
    fn same_key_with_different_scope_is_distinct() {
        let source = file();
        let scope = source.root().children()[0].id();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut ctx = ExecutionContext::for_file(&source, 1);
        assert!(ctx.do_after_visit(AfterVisit::new("b", append("b", &log))));
        assert!(ctx.do_after_visit(AfterVisit::scoped("b", scope, append("b", &log))));
        assert_eq!(ctx.drain_after_visits(&source).print(), "abb");
    }
}
