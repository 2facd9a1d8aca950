//! Conversation state and paginated dialogue buffers

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{DialogueKind, NpcError, NpcResult};
use crate::host::{DialogueContentProvider, DisplayHost};
use crate::text::{paginate, PageLayout};

/// Pre-split lines handed out one at a time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DialogueBuffer {
    lines: Vec<String>,
    remaining: usize,
}

impl DialogueBuffer {
    pub fn new(lines: Vec<String>) -> Self {
        let remaining = lines.len();
        Self { lines, remaining }
    }

    /// Next unread line; `None` once the buffer is exhausted
    pub fn next_line(&mut self) -> Option<String> {
        if self.remaining == 0 {
            return None;
        }
        let line = self.lines[self.lines.len() - self.remaining].clone();
        self.remaining -= 1;
        Some(line)
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.remaining = 0;
    }
}

/// Which kind of conversation the NPC is holding, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationState {
    #[default]
    Idle,
    InDemandDialogue,
    InAutoDialogue,
    InQuestDialogue,
    InBrewDialogue,
}

impl ConversationState {
    pub fn is_idle(&self) -> bool {
        matches!(self, ConversationState::Idle)
    }

    /// A conversation the player opened by interacting (auto dialogue excluded)
    pub fn is_engaged(&self) -> bool {
        matches!(
            self,
            ConversationState::InDemandDialogue
                | ConversationState::InQuestDialogue
                | ConversationState::InBrewDialogue
        )
    }
}

/// Brew score bounds that pick the brewer's script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrewThresholds {
    pub bad: f32,
    pub perfect: f32,
}

impl Default for BrewThresholds {
    fn default() -> Self {
        Self {
            bad: 40.0,
            perfect: 90.0,
        }
    }
}

/// Fixed script the brewer plays instead of its regular dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrewScript {
    Start,
    Fail,
    Good,
    Perfect,
}

impl BrewScript {
    /// Pick the script for a brew score (`None` = minigame not played yet)
    pub fn select(score: Option<f32>, thresholds: &BrewThresholds) -> Self {
        match score {
            None => BrewScript::Start,
            Some(s) if s < thresholds.bad => BrewScript::Fail,
            Some(s) if s < thresholds.perfect => BrewScript::Good,
            Some(_) => BrewScript::Perfect,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            BrewScript::Start => "brewStart",
            BrewScript::Fail => "brewFail",
            BrewScript::Good => "brewGood",
            BrewScript::Perfect => "brewPerfect",
        }
    }
}

/// One NPC's side of a conversation with the dialogue provider
#[derive(Debug, Clone, Default)]
pub struct DialogueSession {
    state: ConversationState,
    buffer: DialogueBuffer,
    layout: PageLayout,
}

impl DialogueSession {
    pub fn new(layout: PageLayout) -> Self {
        Self {
            state: ConversationState::Idle,
            buffer: DialogueBuffer::default(),
            layout,
        }
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn buffered_lines(&self) -> usize {
        self.buffer.remaining()
    }

    /// Open the auto or demand dialogue `id` and return the first thing to show.
    ///
    /// Demand dialogue is paginated; auto dialogue is shown as authored.
    pub fn begin(
        &mut self,
        kind: DialogueKind,
        id: &str,
        provider: &mut dyn DialogueContentProvider,
    ) -> NpcResult<String> {
        self.leave_auto(provider);
        let auto = kind == DialogueKind::Auto;
        let first = provider
            .start_dialogue(id, auto)
            .ok_or_else(|| NpcError::MissingContent {
                kind,
                id: id.to_string(),
            })?;

        let line = match kind {
            DialogueKind::Auto => {
                self.state = ConversationState::InAutoDialogue;
                first
            }
            DialogueKind::Demand => {
                self.state = ConversationState::InDemandDialogue;
                self.paginate_unit(first)?
            }
        };
        debug!("Began {} dialogue '{}'", kind, id);
        Ok(line)
    }

    /// Play an already split script (the brewer's) without pagination
    pub fn begin_brew(
        &mut self,
        script: BrewScript,
        lines: Vec<String>,
        provider: &mut dyn DialogueContentProvider,
    ) -> NpcResult<String> {
        self.leave_auto(provider);
        self.buffer = DialogueBuffer::new(lines);
        let first = self.buffer.next_line().ok_or_else(|| NpcError::MissingContent {
            kind: DialogueKind::Demand,
            id: script.key().to_string(),
        })?;
        self.state = ConversationState::InBrewDialogue;
        info!("Brewer plays script '{}'", script.key());
        Ok(first)
    }

    /// Mark a quest conversation as open; its lines come from elsewhere
    pub fn begin_quest(&mut self, provider: &mut dyn DialogueContentProvider) {
        self.leave_auto(provider);
        self.buffer.clear();
        self.state = ConversationState::InQuestDialogue;
    }

    /// Next page to show, or `None` when the conversation is over
    pub fn advance(&mut self, provider: &mut dyn DialogueContentProvider) -> NpcResult<Option<String>> {
        if let Some(line) = self.buffer.next_line() {
            return Ok(Some(line));
        }
        if self.state == ConversationState::InBrewDialogue {
            return Ok(None);
        }
        match provider.next_dialogue() {
            Some(unit) => self.paginate_unit(unit).map(Some),
            None => Ok(None),
        }
    }

    /// Close the conversation on the provider side and hide the text box
    pub fn end(&mut self, provider: &mut dyn DialogueContentProvider, display: &mut dyn DisplayHost) {
        provider.end_dialogue();
        self.reset();
        display.hide_text();
    }

    /// Forget the conversation without notifying anyone
    pub fn reset(&mut self) {
        self.state = ConversationState::Idle;
        self.buffer.clear();
    }

    fn leave_auto(&mut self, provider: &mut dyn DialogueContentProvider) {
        if self.state == ConversationState::InAutoDialogue {
            provider.end_dialogue();
            self.state = ConversationState::Idle;
        }
    }

    // Pages go to the buffer; an unpaginated unit is shown whole
    fn paginate_unit(&mut self, unit: String) -> NpcResult<String> {
        self.buffer = DialogueBuffer::new(paginate(Some(&unit), &self.layout)?);
        Ok(self.buffer.next_line().unwrap_or(unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::DialogueLibrary;
    use crate::sim::TextLog;

    fn library() -> DialogueLibrary {
        let mut lib = DialogueLibrary::default();
        lib.insert_dialogue("greeting", ["Bonjour!", "Il fait beau¢aujourd'hui."]);
        lib.insert_dialogue("auto", ["Hé, vous là!"]);
        lib
    }

    #[test]
    fn test_buffer_hands_out_in_order() {
        let mut buffer = DialogueBuffer::new(vec!["a".into(), "b".into()]);
        assert_eq!(buffer.remaining(), 2);
        assert_eq!(buffer.next_line().as_deref(), Some("a"));
        assert_eq!(buffer.next_line().as_deref(), Some("b"));
        assert!(buffer.is_exhausted());
        assert_eq!(buffer.next_line(), None);
    }

    #[test]
    fn test_brew_script_selection() {
        let thresholds = BrewThresholds::default();
        assert_eq!(BrewScript::select(None, &thresholds), BrewScript::Start);
        assert_eq!(BrewScript::select(Some(35.0), &thresholds), BrewScript::Fail);
        assert_eq!(BrewScript::select(Some(60.0), &thresholds), BrewScript::Good);
        assert_eq!(BrewScript::select(Some(95.0), &thresholds), BrewScript::Perfect);
        assert_eq!(BrewScript::select(Some(40.0), &thresholds), BrewScript::Good);
        assert_eq!(BrewScript::select(Some(90.0), &thresholds), BrewScript::Perfect);
    }

    #[test]
    fn test_demand_dialogue_walks_units_and_pages() {
        let mut lib = library();
        let mut session = DialogueSession::new(PageLayout::default());

        let first = session.begin(DialogueKind::Demand, "greeting", &mut lib).unwrap();
        assert_eq!(first, "Bonjour!");
        assert_eq!(session.state(), ConversationState::InDemandDialogue);

        assert_eq!(session.advance(&mut lib).unwrap().as_deref(), Some("Il fait beau"));
        assert_eq!(session.advance(&mut lib).unwrap().as_deref(), Some("aujourd'hui."));
        assert_eq!(session.advance(&mut lib).unwrap(), None);
    }

    #[test]
    fn test_missing_demand_content() {
        let mut lib = library();
        let mut session = DialogueSession::new(PageLayout::default());
        let err = session.begin(DialogueKind::Demand, "nobody", &mut lib).unwrap_err();
        assert_eq!(
            err,
            NpcError::MissingContent {
                kind: DialogueKind::Demand,
                id: "nobody".into()
            }
        );
        assert!(session.state().is_idle());
    }

    #[test]
    fn test_auto_dialogue_is_replaced_by_demand() {
        let mut lib = library();
        let mut session = DialogueSession::new(PageLayout::default());
        session.begin(DialogueKind::Auto, "auto", &mut lib).unwrap();
        assert_eq!(session.state(), ConversationState::InAutoDialogue);
        assert!(!session.state().is_engaged());

        session.begin(DialogueKind::Demand, "greeting", &mut lib).unwrap();
        assert_eq!(session.state(), ConversationState::InDemandDialogue);
    }

    #[test]
    fn test_brew_script_is_not_paginated_or_extended() {
        let mut lib = library();
        let mut session = DialogueSession::new(PageLayout::new(2, 1));
        let lines = vec!["Une longue ligne".to_string(), "Fin".to_string()];
        let first = session.begin_brew(BrewScript::Start, lines, &mut lib).unwrap();
        assert_eq!(first, "Une longue ligne");
        assert_eq!(session.advance(&mut lib).unwrap().as_deref(), Some("Fin"));
        assert_eq!(session.advance(&mut lib).unwrap(), None);
    }

    #[test]
    fn test_empty_brew_script_is_missing_content() {
        let mut lib = library();
        let mut session = DialogueSession::new(PageLayout::default());
        assert!(matches!(
            session.begin_brew(BrewScript::Good, Vec::new(), &mut lib),
            Err(NpcError::MissingContent { .. })
        ));
    }

    #[test]
    fn test_end_clears_everything() {
        let mut lib = library();
        let mut display = TextLog::default();
        let mut session = DialogueSession::new(PageLayout::default());
        session.begin(DialogueKind::Demand, "greeting", &mut lib).unwrap();
        session.advance(&mut lib).unwrap();
        assert!(session.buffered_lines() > 0);

        session.end(&mut lib, &mut display);
        assert!(session.state().is_idle());
        assert_eq!(session.buffered_lines(), 0);
        assert!(!lib.is_open());
        assert!(!display.is_text_visible());
    }
}
