//! Small recipes over hand-built trees shared by the runtime tests.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    AfterVisit, Cursor, ExecutionContext, Language, Node, Recipe, RecipeError, ScanningRecipe,
    SourceFile, TreeVisitor, walk_children,
};

/// Builds a file whose root holds one token per word.
pub(crate) fn words(path: &str, text: &str) -> Arc<SourceFile> {
    let children = text
        .split(' ')
        .enumerate()
        .map(|(index, word)| {
            let prefix = if index == 0 { "" } else { " " };
            Arc::new(Node::token("word", word.to_owned()).with_prefix(prefix))
        })
        .collect();
    let root = Arc::new(Node::branch("sentence", children));
    Arc::new(SourceFile::new(path, Language::Properties, root, "\n"))
}

/// Rewrites every token equal to `from` into `to`.
pub(crate) struct Replace {
    pub(crate) name: &'static str,
    pub(crate) from: &'static str,
    pub(crate) to: &'static str,
}

struct ReplaceVisitor {
    from: &'static str,
    to: &'static str,
}

impl TreeVisitor for ReplaceVisitor {
    fn visit(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        let node = walk_children(self, cursor, ctx);
        if node.text() == Some(self.from) {
            Arc::new(node.with_text(self.to))
        } else {
            node
        }
    }
}

impl Recipe for Replace {
    fn name(&self) -> &str {
        self.name
    }

    fn validate(&self) -> Result<(), RecipeError> {
        if self.from.is_empty() {
            return Err(RecipeError::missing_option(self.name, "from"));
        }
        Ok(())
    }

    fn editor<'a>(
        &'a self,
        _acc: Option<&'a crate::Accumulator>,
    ) -> Option<Box<dyn TreeVisitor + 'a>> {
        Some(Box::new(ReplaceVisitor {
            from: self.from,
            to: self.to,
        }))
    }
}

/// Appends `!` to the last word on every run; never converges.
pub(crate) struct Shout;

struct ShoutVisitor;

impl TreeVisitor for ShoutVisitor {
    fn visit(&mut self, cursor: &Cursor<'_>, _ctx: &mut ExecutionContext) -> Arc<Node> {
        let node = cursor.value();
        let Some(last) = node.children().len().checked_sub(1) else {
            return Arc::clone(node);
        };
        let word = &node.children()[last];
        let text = format!("{}!", word.text().unwrap_or_default());
        Arc::new(node.with_child(last, Arc::new(word.with_text(text))))
    }
}

impl Recipe for Shout {
    fn name(&self) -> &str {
        "test.Shout"
    }

    fn editor<'a>(
        &'a self,
        _acc: Option<&'a crate::Accumulator>,
    ) -> Option<Box<dyn TreeVisitor + 'a>> {
        Some(Box::new(ShoutVisitor))
    }
}

/// Composite recipe holding a fixed list.
pub(crate) struct Composite(pub(crate) Vec<Arc<dyn Recipe>>);

impl Recipe for Composite {
    fn name(&self) -> &str {
        "test.Composite"
    }

    fn recipe_list(&self) -> Vec<Arc<dyn Recipe>> {
        self.0.clone()
    }
}

/// Counts how many times its editor visits a file root.
pub(crate) struct Counting {
    pub(crate) visits: Arc<AtomicUsize>,
}

struct CountingVisitor {
    visits: Arc<AtomicUsize>,
}

impl TreeVisitor for CountingVisitor {
    fn visit(&mut self, cursor: &Cursor<'_>, _ctx: &mut ExecutionContext) -> Arc<Node> {
        self.visits.fetch_add(1, Ordering::SeqCst);
        Arc::clone(cursor.value())
    }
}

impl Recipe for Counting {
    fn name(&self) -> &str {
        "test.Counting"
    }

    fn editor<'a>(
        &'a self,
        _acc: Option<&'a crate::Accumulator>,
    ) -> Option<Box<dyn TreeVisitor + 'a>> {
        Some(Box::new(CountingVisitor {
            visits: Arc::clone(&self.visits),
        }))
    }
}

/// Collects every word seen in any file, then appends the sorted
/// vocabulary size to each file that has fewer words than the total.
pub(crate) struct Vocabulary;

pub(crate) struct VocabularyAcc {
    words: Mutex<BTreeSet<String>>,
}

struct VocabularyScanner<'a> {
    acc: &'a VocabularyAcc,
}

impl TreeVisitor for VocabularyScanner<'_> {
    fn visit(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        if let Some(text) = cursor.value().text() {
            if let Ok(mut words) = self.acc.words.lock() {
                words.insert(text.trim_end_matches(|c: char| c.is_ascii_digit()).to_owned());
            }
        }
        walk_children(self, cursor, ctx)
    }
}

struct VocabularyEditor {
    total: usize,
}

impl TreeVisitor for VocabularyEditor {
    fn visit(&mut self, cursor: &Cursor<'_>, _ctx: &mut ExecutionContext) -> Arc<Node> {
        let node = cursor.value();
        if node.children().iter().any(|word| word.is("total")) {
            return Arc::clone(node);
        }
        let marker = Arc::new(Node::token("total", self.total.to_string()).with_prefix(" "));
        Arc::new(node.with_inserted_child(usize::MAX, marker))
    }
}

impl ScanningRecipe for Vocabulary {
    type Acc = VocabularyAcc;

    fn name(&self) -> &str {
        "test.Vocabulary"
    }

    fn initial_value(&self) -> Self::Acc {
        VocabularyAcc {
            words: Mutex::new(BTreeSet::new()),
        }
    }

    fn scanner<'a>(&'a self, acc: &'a Self::Acc) -> Box<dyn TreeVisitor + 'a> {
        Box::new(VocabularyScanner { acc })
    }

    fn generate(&self, acc: &Self::Acc) -> Vec<SourceFile> {
        let count = acc.words.lock().map(|words| words.len()).unwrap_or_default();
        let file = words("generated.txt", &format!("vocabulary{count}"));
        vec![(*file).clone()]
    }

    fn editor<'a>(&'a self, acc: &'a Self::Acc) -> Option<Box<dyn TreeVisitor + 'a>> {
        let total = acc.words.lock().map(|words| words.len()).unwrap_or_default();
        Some(Box::new(VocabularyEditor { total }))
    }
}

/// Schedules a follow-up that upper-cases the first word.
pub(crate) struct FollowUp;

struct FollowUpVisitor;

struct UpperFirst;

impl TreeVisitor for UpperFirst {
    fn visit(&mut self, cursor: &Cursor<'_>, _ctx: &mut ExecutionContext) -> Arc<Node> {
        let node = cursor.value();
        let Some(first) = node.children().first() else {
            return Arc::clone(node);
        };
        let text = first.text().unwrap_or_default();
        let upper = text.to_uppercase();
        if upper == text {
            return Arc::clone(node);
        }
        Arc::new(node.with_child(0, Arc::new(first.with_text(upper))))
    }
}

impl TreeVisitor for FollowUpVisitor {
    fn visit(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        ctx.do_after_visit(AfterVisit::new("upper-first", Box::new(UpperFirst)));
        Arc::clone(cursor.value())
    }
}

impl Recipe for FollowUp {
    fn name(&self) -> &str {
        "test.FollowUp"
    }

    fn editor<'a>(
        &'a self,
        _acc: Option<&'a crate::Accumulator>,
    ) -> Option<Box<dyn TreeVisitor + 'a>> {
        Some(Box::new(FollowUpVisitor))
    }
}

/// Scans only files named `scanned.txt`, counting every root it visits.
pub(crate) struct GatedScan {
    pub(crate) visits: Arc<AtomicUsize>,
}

struct GatedScanner<'a> {
    visits: &'a AtomicUsize,
}

impl TreeVisitor for GatedScanner<'_> {
    fn is_acceptable(&self, file: &SourceFile, _ctx: &ExecutionContext) -> bool {
        file.path().as_str() == "scanned.txt"
    }

    fn visit(&mut self, cursor: &Cursor<'_>, _ctx: &mut ExecutionContext) -> Arc<Node> {
        self.visits.fetch_add(1, Ordering::SeqCst);
        Arc::clone(cursor.value())
    }
}

impl ScanningRecipe for GatedScan {
    type Acc = ();

    fn name(&self) -> &str {
        "test.GatedScan"
    }

    fn initial_value(&self) -> Self::Acc {}

    fn scanner<'a>(&'a self, _acc: &'a Self::Acc) -> Box<dyn TreeVisitor + 'a> {
        Box::new(GatedScanner {
            visits: &self.visits,
        })
    }

    fn editor<'a>(&'a self, _acc: &'a Self::Acc) -> Option<Box<dyn TreeVisitor + 'a>> {
        None
    }
}

/// Requests the same no-op follow-up as every other instance, so later
/// instances keep deferring it to the next cycle.
pub(crate) struct Settle(pub(crate) &'static str);

struct Idle;

impl TreeVisitor for Idle {
    fn visit(&mut self, cursor: &Cursor<'_>, _ctx: &mut ExecutionContext) -> Arc<Node> {
        Arc::clone(cursor.value())
    }
}

struct SettleVisitor;

impl TreeVisitor for SettleVisitor {
    fn visit(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        ctx.do_after_visit(AfterVisit::new("settle", Box::new(Idle)));
        Arc::clone(cursor.value())
    }
}

impl Recipe for Settle {
    fn name(&self) -> &str {
        self.0
    }

    fn editor<'a>(
        &'a self,
        _acc: Option<&'a crate::Accumulator>,
    ) -> Option<Box<dyn TreeVisitor + 'a>> {
        Some(Box::new(SettleVisitor))
    }
}
