//! Events, listeners and attribute extraction.
//!
//! The model reports what happened as [`EventKind`] values; the runner
//! forwards them to registered [`EventListener`]s together with the state
//! the event left behind. Listeners observe, they never mutate.
//!
//! ## Attributes
//!
//! An [`Attribute`] is a named extraction function over the state. The
//! bundled [`AttributeListener`] evaluates a set of attributes on every
//! event and hands the resulting row to a [`StatSink`], which is how
//! per-game statistics get collected without the engine knowing anything
//! about what is being measured.

use rustc_hash::FxHashMap;

use crate::actions::Action;
use crate::core::ids::PlayerId;
use crate::core::state::GameState;
use crate::turn::Phase;

/// Something that happened during [`ForwardModel::apply`].
///
/// [`ForwardModel::apply`]: crate::model::ForwardModel::apply
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// An action passed validation and was applied.
    ActionApplied { player: PlayerId, action: Action },
    /// A named in-game occurrence, e.g. the outcome of a chance roll.
    GameEvent { player: PlayerId, label: String },
    /// A round boundary was crossed; `round` is the round that ended.
    RoundEnded { round: u32 },
    /// The end rule fired; the state carries final results.
    GameOver,
}

impl EventKind {
    /// Short machine-friendly label for grouping rows.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::ActionApplied { .. } => "action",
            EventKind::GameEvent { .. } => "event",
            EventKind::RoundEnded { .. } => "round_end",
            EventKind::GameOver => "game_over",
        }
    }
}

/// Observer of a running game. All hooks take the state immutably.
pub trait EventListener {
    /// Called after every event, with the state the event produced.
    fn on_event(&mut self, event: &EventKind, state: &GameState);

    /// Called once when the game is over, after the final `GameOver` event.
    fn finished(&mut self, _state: &GameState) {}
}

/// A value extracted by an attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    Int(i64),
    Text(String),
}

/// A named extraction over (state, event).
///
/// Plain function pointers keep attribute sets `Copy`-friendly and
/// trivially shareable across games.
#[derive(Clone, Copy)]
pub struct Attribute {
    pub name: &'static str,
    pub extract: fn(&GameState, &EventKind) -> AttrValue,
}

/// One extracted row: the event label plus a value per attribute.
#[derive(Clone, Debug)]
pub struct StatRow {
    pub event: &'static str,
    pub values: FxHashMap<&'static str, AttrValue>,
}

/// Receives extracted rows.
pub trait StatSink {
    fn record(&mut self, row: StatRow);

    /// Called once after the final row.
    fn close(&mut self) {}
}

/// Emits every row as a `tracing` info event.
#[derive(Default)]
pub struct TracingSink;

impl StatSink for TracingSink {
    fn record(&mut self, row: StatRow) {
        tracing::info!(target: "steward::stats", event = row.event, values = ?row.values);
    }
}

/// Buffers rows in memory, mainly for tests and notebook-style analysis.
#[derive(Default)]
pub struct MemorySink {
    rows: Vec<StatRow>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows recorded so far.
    #[must_use]
    pub fn rows(&self) -> &[StatRow] {
        &self.rows
    }

    /// Consume the sink, returning its rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<StatRow> {
        self.rows
    }
}

impl StatSink for MemorySink {
    fn record(&mut self, row: StatRow) {
        self.rows.push(row);
    }
}

/// Evaluates a fixed attribute set on every event and forwards the rows.
pub struct AttributeListener<S: StatSink> {
    attributes: Vec<Attribute>,
    sink: S,
}

impl<S: StatSink> AttributeListener<S> {
    #[must_use]
    pub fn new(attributes: Vec<Attribute>, sink: S) -> Self {
        Self { attributes, sink }
    }

    /// Access the sink, e.g. to read a `MemorySink` back after a run.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the listener, returning the sink.
    #[must_use]
    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<S: StatSink> EventListener for AttributeListener<S> {
    fn on_event(&mut self, event: &EventKind, state: &GameState) {
        let values = self
            .attributes
            .iter()
            .map(|attr| (attr.name, (attr.extract)(state, event)))
            .collect();
        self.sink.record(StatRow {
            event: event.label(),
            values,
        });
    }

    fn finished(&mut self, _state: &GameState) {
        self.sink.close();
    }
}

/// The attribute set most runs want: round, season, acting player and a
/// human-readable description of what happened.
#[must_use]
pub fn standard_attributes() -> Vec<Attribute> {
    vec![
        Attribute {
            name: "round",
            extract: |state, _| AttrValue::Int(i64::from(state.turn.round)),
        },
        Attribute {
            name: "season",
            extract: |state, _| {
                AttrValue::Text(state.params.season_name(state.turn.season).to_owned())
            },
        },
        Attribute {
            name: "phase",
            extract: |state, _| {
                AttrValue::Text(
                    match state.turn.phase {
                        Phase::Placement => "placement",
                        Phase::Use => "use",
                    }
                    .to_owned(),
                )
            },
        },
        Attribute {
            name: "ap",
            extract: |state, _| AttrValue::Int(i64::from(state.turn.ap())),
        },
        Attribute {
            name: "player",
            extract: |state, event| match event {
                EventKind::ActionApplied { player, .. }
                | EventKind::GameEvent { player, .. } => AttrValue::Int(player.index() as i64),
                _ => AttrValue::Int(state.current_player().index() as i64),
            },
        },
        Attribute {
            name: "detail",
            extract: |state, event| {
                AttrValue::Text(match event {
                    EventKind::ActionApplied { action, .. } => action.label(&state.params),
                    EventKind::GameEvent { label, .. } => label.clone(),
                    EventKind::RoundEnded { round } => format!("round {round} ended"),
                    EventKind::GameOver => "game over".to_owned(),
                })
            },
        },
    ]
}
