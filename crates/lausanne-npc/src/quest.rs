//! Notebook answer evaluation
//!
//! The player fills one notebook tab per suspect. A tab is compared against
//! the canonical answers in every supported language and a field counts as
//! right when it matches in any of them.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::BitOr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dialogue::DialogueBuffer;
use crate::error::{DialogueKind, NpcResult};
use crate::host::{DialogueContentProvider, QuestSolutionProvider};
use crate::text::format_template;
use crate::world::{Language, WorldContext};

/// Field-keyed answers for one notebook tab
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet {
    pub fields: BTreeMap<String, String>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Compare a submission against this canonical sheet.
    ///
    /// Every solution field is judged; extra submitted fields are ignored.
    /// Values match when equal after trimming, ignoring case.
    pub fn judge(&self, submission: &AnswerSheet) -> QuestComparisonResult {
        let fields = self
            .fields
            .iter()
            .map(|(field, expected)| {
                let matched = submission
                    .get(field)
                    .is_some_and(|given| normalize(given) == normalize(expected));
                (field.clone(), matched)
            })
            .collect();
        QuestComparisonResult {
            fields,
            all_tabs_correct: false,
        }
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Outcome of comparing one tab, combinable across languages with `|`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestComparisonResult {
    /// Whether each judged field matched
    pub fields: BTreeMap<String, bool>,
    pub all_tabs_correct: bool,
}

impl QuestComparisonResult {
    /// Every judged field matched (and there was something to judge)
    pub fn is_correct(&self) -> bool {
        !self.fields.is_empty() && self.fields.values().all(|&matched| matched)
    }

    pub fn is_all_tabs_correct(&self) -> bool {
        self.all_tabs_correct
    }

    /// Fields that did not match
    pub fn outliers(&self) -> BTreeSet<String> {
        self.fields
            .iter()
            .filter(|(_, &matched)| !matched)
            .map(|(field, _)| field.clone())
            .collect()
    }

    /// Component-wise OR; the default value is the identity
    pub fn or(mut self, other: &QuestComparisonResult) -> Self {
        for (field, &matched) in &other.fields {
            *self.fields.entry(field.clone()).or_insert(false) |= matched;
        }
        self.all_tabs_correct |= other.all_tabs_correct;
        self
    }
}

impl BitOr for QuestComparisonResult {
    type Output = QuestComparisonResult;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(&rhs)
    }
}

/// Dialogue keys the quest NPC answers with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestDialogueKeys {
    pub all_correct: String,
    pub correct: String,
    pub wrong_singular: String,
    pub wrong_plural: String,
}

impl Default for QuestDialogueKeys {
    fn default() -> Self {
        Self {
            all_correct: "questTextAllCorrect".into(),
            correct: "questTextCorrect".into(),
            wrong_singular: "questTextWrongSingular".into(),
            wrong_plural: "questTextWrongPlural".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestEvaluatorConfig {
    /// Suspect names shown for each notebook tab, by tab index
    pub tab_names: Vec<String>,
    /// Dialogue source holding the quest scripts
    pub source: String,
    pub keys: QuestDialogueKeys,
}

impl Default for QuestEvaluatorConfig {
    fn default() -> Self {
        Self {
            tab_names: ["Cerjeat", "Trüschel", "Perregaux", "Montelieu", "Mercier", "Rochat"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            source: "dialogues/quest_npc".into(),
            keys: QuestDialogueKeys::default(),
        }
    }
}

/// Which script the quest NPC plays after an evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestResponse {
    AllCorrect,
    Correct { incorrect_tabs: usize },
    Wrong { tab_name: String, outliers: usize },
}

pub struct QuestEvaluator {
    pub config: QuestEvaluatorConfig,
    buffer: DialogueBuffer,
}

impl QuestEvaluator {
    pub fn new(config: QuestEvaluatorConfig) -> Self {
        Self {
            config,
            buffer: DialogueBuffer::default(),
        }
    }

    /// Judge `submission` for `tab` against every language, OR-folded
    pub fn compare(
        &self,
        submission: &AnswerSheet,
        tab: usize,
        solutions: &dyn QuestSolutionProvider,
        world: &dyn WorldContext,
    ) -> QuestComparisonResult {
        let mut result = Language::ALL
            .iter()
            .map(|&language| solutions.query_solution(tab, language).judge(submission))
            .fold(QuestComparisonResult::default(), |acc, partial| acc | partial);
        result.all_tabs_correct = world.all_tabs_correct();
        debug!(
            "Tab {} judged: correct={}, outliers={:?}",
            tab,
            result.is_correct(),
            result.outliers()
        );
        result
    }

    /// Pick the response script. A finished notebook wins over everything else.
    pub fn select_response(&self, result: &QuestComparisonResult, world: &dyn WorldContext) -> QuestResponse {
        if world.all_tabs_correct() || result.is_all_tabs_correct() {
            return QuestResponse::AllCorrect;
        }
        if result.is_correct() {
            return QuestResponse::Correct {
                incorrect_tabs: world.count_incorrect_tabs(),
            };
        }
        let tab = world.current_tab_index();
        let tab_name = self
            .config
            .tab_names
            .get(tab)
            .cloned()
            .unwrap_or_else(|| format!("#{}", tab + 1));
        QuestResponse::Wrong {
            tab_name,
            outliers: result.outliers().len(),
        }
    }

    /// Fetch and fill the lines of a response script
    pub fn response_lines(
        &self,
        response: &QuestResponse,
        provider: &dyn DialogueContentProvider,
    ) -> NpcResult<Vec<String>> {
        let keys = &self.config.keys;
        let (key, args) = match response {
            QuestResponse::AllCorrect => (&keys.all_correct, Vec::new()),
            QuestResponse::Correct { incorrect_tabs } => (&keys.correct, vec![incorrect_tabs.to_string()]),
            QuestResponse::Wrong { tab_name, outliers } => {
                let key = if *outliers > 1 {
                    &keys.wrong_plural
                } else {
                    &keys.wrong_singular
                };
                (key, vec![tab_name.clone(), outliers.to_string()])
            }
        };
        let text = provider.query_dialogue(key, DialogueKind::Demand, &self.config.source);
        format_template(text.as_deref(), &args)
    }

    /// Load a fresh script into the quest buffer
    pub fn open(&mut self, lines: Vec<String>) {
        self.buffer = DialogueBuffer::new(lines);
    }

    pub fn next_line(&mut self) -> Option<String> {
        self.buffer.next_line()
    }

    pub fn buffered_lines(&self) -> usize {
        self.buffer.remaining()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{DialogueLibrary, SessionState, SolutionBook};
    use crate::error::NpcError;
    use proptest::prelude::*;

    fn result(fields: &[(&str, bool)]) -> QuestComparisonResult {
        QuestComparisonResult {
            fields: fields.iter().map(|(f, m)| (f.to_string(), *m)).collect(),
            all_tabs_correct: false,
        }
    }

    fn book() -> SolutionBook {
        let mut book = SolutionBook::default();
        book.insert(
            0,
            Language::French,
            AnswerSheet::new().with("profession", "brasseur").with("origine", "Berne"),
        );
        book.insert(
            0,
            Language::German,
            AnswerSheet::new().with("profession", "Bierbrauer").with("origine", "Bern"),
        );
        book.insert(
            0,
            Language::English,
            AnswerSheet::new().with("profession", "brewer").with("origine", "Bern"),
        );
        book
    }

    fn quest_library() -> DialogueLibrary {
        let mut lib = DialogueLibrary::default();
        let source = QuestEvaluatorConfig::default().source;
        lib.insert_script(&source, "questTextAllCorrect", ["Bravo, tout est juste!"]);
        lib.insert_script(&source, "questTextCorrect", ["Juste!", "Encore {0} onglets."]);
        lib.insert_script(&source, "questTextWrongSingular", ["{0}: {1} erreur."]);
        lib.insert_script(&source, "questTextWrongPlural", ["{0}: {1} erreurs."]);
        lib
    }

    #[test]
    fn test_judge_ignores_case_and_spaces() {
        let solution = AnswerSheet::new().with("nom", "Rochat");
        let r = solution.judge(&AnswerSheet::new().with("nom", "  rochat "));
        assert!(r.is_correct());
    }

    #[test]
    fn test_judge_missing_field_is_outlier() {
        let solution = AnswerSheet::new().with("nom", "Rochat").with("age", "42");
        let r = solution.judge(&AnswerSheet::new().with("nom", "Rochat"));
        assert!(!r.is_correct());
        assert_eq!(r.outliers().into_iter().collect::<Vec<_>>(), vec!["age".to_string()]);
    }

    #[test]
    fn test_empty_result_is_not_correct() {
        assert!(!QuestComparisonResult::default().is_correct());
    }

    #[test]
    fn test_match_in_one_language_is_enough() {
        let evaluator = QuestEvaluator::new(QuestEvaluatorConfig::default());
        let world = SessionState::with_tabs(6);
        let submission = AnswerSheet::new().with("profession", "Bierbrauer").with("origine", "Berne");
        let r = evaluator.compare(&submission, 0, &book(), &world);
        assert!(r.is_correct(), "outliers: {:?}", r.outliers());
    }

    #[test]
    fn test_mismatch_everywhere_is_outlier() {
        let evaluator = QuestEvaluator::new(QuestEvaluatorConfig::default());
        let world = SessionState::with_tabs(6);
        let submission = AnswerSheet::new().with("profession", "boulanger").with("origine", "Bern");
        let r = evaluator.compare(&submission, 0, &book(), &world);
        assert!(!r.is_correct());
        assert_eq!(r.outliers().len(), 1);
        assert!(r.outliers().contains("profession"));
    }

    #[test]
    fn test_all_tabs_correct_wins() {
        let evaluator = QuestEvaluator::new(QuestEvaluatorConfig::default());
        let mut world = SessionState::with_tabs(2);
        world.tabs = vec![true, true];
        let wrong = result(&[("a", false), ("b", false)]);
        assert_eq!(evaluator.select_response(&wrong, &world), QuestResponse::AllCorrect);
    }

    #[test]
    fn test_correct_tab_reports_remaining() {
        let evaluator = QuestEvaluator::new(QuestEvaluatorConfig::default());
        let mut world = SessionState::with_tabs(6);
        world.tabs[0] = true;
        let right = result(&[("a", true)]);
        assert_eq!(
            evaluator.select_response(&right, &world),
            QuestResponse::Correct { incorrect_tabs: 5 }
        );
    }

    #[test]
    fn test_wrong_tab_names_the_suspect() {
        let evaluator = QuestEvaluator::new(QuestEvaluatorConfig::default());
        let mut world = SessionState::with_tabs(6);
        world.current_tab = 5;
        let wrong = result(&[("a", false), ("b", false), ("c", true)]);
        assert_eq!(
            evaluator.select_response(&wrong, &world),
            QuestResponse::Wrong {
                tab_name: "Rochat".into(),
                outliers: 2
            }
        );
    }

    #[test]
    fn test_response_lines_pick_plural() {
        let evaluator = QuestEvaluator::new(QuestEvaluatorConfig::default());
        let lib = quest_library();
        let plural = QuestResponse::Wrong {
            tab_name: "Mercier".into(),
            outliers: 3,
        };
        assert_eq!(evaluator.response_lines(&plural, &lib).unwrap(), vec!["Mercier: 3 erreurs."]);

        let singular = QuestResponse::Wrong {
            tab_name: "Mercier".into(),
            outliers: 1,
        };
        assert_eq!(evaluator.response_lines(&singular, &lib).unwrap(), vec!["Mercier: 1 erreur."]);

        let correct = QuestResponse::Correct { incorrect_tabs: 4 };
        assert_eq!(
            evaluator.response_lines(&correct, &lib).unwrap(),
            vec!["Juste!", "Encore 4 onglets."]
        );
    }

    #[test]
    fn test_missing_script_is_invalid_argument() {
        let evaluator = QuestEvaluator::new(QuestEvaluatorConfig::default());
        let lib = DialogueLibrary::default();
        assert!(matches!(
            evaluator.response_lines(&QuestResponse::AllCorrect, &lib),
            Err(NpcError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_quest_buffer() {
        let mut evaluator = QuestEvaluator::new(QuestEvaluatorConfig::default());
        evaluator.open(vec!["un".into(), "deux".into()]);
        assert_eq!(evaluator.buffered_lines(), 2);
        assert_eq!(evaluator.next_line().as_deref(), Some("un"));
        evaluator.clear();
        assert_eq!(evaluator.next_line(), None);
    }

    fn arb_result() -> impl Strategy<Value = QuestComparisonResult> {
        (
            prop::collection::btree_map("[a-d]", any::<bool>(), 0..4),
            any::<bool>(),
        )
            .prop_map(|(fields, all_tabs_correct)| QuestComparisonResult {
                fields,
                all_tabs_correct,
            })
    }

    proptest! {
        #[test]
        fn prop_or_is_commutative(a in arb_result(), b in arb_result()) {
            prop_assert_eq!(a.clone() | b.clone(), b | a);
        }

        #[test]
        fn prop_or_is_associative(a in arb_result(), b in arb_result(), c in arb_result()) {
            prop_assert_eq!((a.clone() | b.clone()) | c.clone(), a | (b | c));
        }

        #[test]
        fn prop_default_is_identity(a in arb_result()) {
            prop_assert_eq!(QuestComparisonResult::default() | a.clone(), a.clone());
            prop_assert_eq!(a.clone() | QuestComparisonResult::default(), a);
        }
    }
}
