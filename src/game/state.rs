//! Game State Definitions
//!
//! The aggregate root and everything it owns: profile, seed position,
//! wallet, collection, deck, the active run, the bounded activity log and
//! the online sub-state. Uses BTreeMap wherever iteration order could leak
//! into saves or fingerprints.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::rng::{generate_seed, SeedState};
use crate::game::collection::{starter_collection, Collection};
use crate::game::config::{Difficulty, Rules};
use crate::game::run::Run;

/// Number of activity log entries kept.
pub const LOG_CAPACITY: usize = 120;

/// Number of relay chat lines kept.
pub const ONLINE_LOG_CAPACITY: usize = 120;

/// Default relay URL.
pub const ONLINE_DEFAULT_URL: &str = "ws://localhost:8787";

// =============================================================================
// CURRENCIES
// =============================================================================

/// A spendable currency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// Soft currency earned from runs.
    Credits,
    /// Premium-ish currency from boons and victories.
    Embers,
    /// Vault keys.
    Shards,
}

impl Currency {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Currency::Credits => "credits",
            Currency::Embers => "embers",
            Currency::Shards => "shards",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wallet balances. Unsigned, so never negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currencies {
    /// Credits.
    #[serde(default)]
    pub credits: u64,
    /// Embers.
    #[serde(default)]
    pub embers: u64,
    /// Shards.
    #[serde(default)]
    pub shards: u64,
}

impl Currencies {
    /// Balance of one currency.
    pub fn balance(&self, currency: Currency) -> u64 {
        match currency {
            Currency::Credits => self.credits,
            Currency::Embers => self.embers,
            Currency::Shards => self.shards,
        }
    }

    fn slot(&mut self, currency: Currency) -> &mut u64 {
        match currency {
            Currency::Credits => &mut self.credits,
            Currency::Embers => &mut self.embers,
            Currency::Shards => &mut self.shards,
        }
    }

    /// Add to a balance.
    pub fn credit(&mut self, currency: Currency, amount: u64) {
        let slot = self.slot(currency);
        *slot = slot.saturating_add(amount);
    }

    /// Add every balance of `other`.
    pub fn credit_all(&mut self, other: &Currencies) {
        self.credit(Currency::Credits, other.credits);
        self.credit(Currency::Embers, other.embers);
        self.credit(Currency::Shards, other.shards);
    }

    /// First currency (in `Currency` order) the wallet cannot cover.
    pub fn first_shortfall(&self, cost: &BTreeMap<Currency, u64>) -> Option<Currency> {
        cost.iter()
            .find(|(currency, amount)| self.balance(**currency) < **amount)
            .map(|(currency, _)| *currency)
    }

    /// Debit a whole price, or nothing if any balance is short.
    ///
    /// Returns the first short currency on failure.
    pub fn try_debit(&mut self, cost: &BTreeMap<Currency, u64>) -> Result<(), Currency> {
        if let Some(short) = self.first_shortfall(cost) {
            return Err(short);
        }
        for (currency, amount) in cost {
            let slot = self.slot(*currency);
            *slot -= *amount;
        }
        Ok(())
    }
}

// =============================================================================
// PROFILE
// =============================================================================

/// Solo or co-op play.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayMode {
    /// Single player.
    #[default]
    Solo,
    /// Shared seed with relay peers.
    Coop,
}

/// Player profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Pilot name shown to peers.
    pub pilot: String,
    /// Cosmetic title.
    pub title: String,
    /// Free-form quest line.
    pub quest: String,
    /// Seed string of the current session.
    pub seed: String,
    /// Difficulty tier for new runs.
    pub difficulty: Difficulty,
    /// Solo or co-op.
    pub mode: PlayMode,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            pilot: String::new(),
            title: "Axis Runner".to_string(),
            quest: String::new(),
            seed: String::new(),
            difficulty: Difficulty::Standard,
            mode: PlayMode::Solo,
        }
    }
}

// =============================================================================
// LOGS
// =============================================================================

/// Kind of activity log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// Run started.
    Run,
    /// Run ended.
    Cashout,
    /// Card played.
    Card,
    /// Threat gate fired.
    Threat,
}

/// One activity log entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Entry kind.
    #[serde(rename = "type")]
    pub kind: LogKind,
    /// Headline.
    pub title: String,
    /// Detail text.
    #[serde(default)]
    pub body: String,
    /// Extra context, e.g. the encounter element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    /// Unix milliseconds.
    #[serde(default)]
    pub timestamp: i64,
}

impl LogEntry {
    /// Entry stamped with the current time.
    pub fn new(kind: LogKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            body: body.into(),
            meta: None,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Attach meta text.
    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        self.meta = Some(meta.into());
        self
    }
}

/// One recorded pack pull.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GachaRecord {
    /// Pack display name.
    pub pack: String,
    /// Card ids in draw order.
    pub results: Vec<String>,
    /// Unix milliseconds.
    #[serde(default)]
    pub timestamp: i64,
}

// =============================================================================
// ONLINE
// =============================================================================

/// Relay connection status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnlineStatus {
    /// Not connected.
    #[default]
    Offline,
    /// Connection requested.
    Connecting,
    /// Connected to the relay.
    Online,
}

/// One line of relay chat or system text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLine {
    /// Sender name, or "system".
    pub sender: String,
    /// Text.
    pub message: String,
}

/// Relay sub-state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnlineState {
    /// Relay enabled by the player.
    pub enabled: bool,
    /// Relay URL.
    pub url: String,
    /// Room override; the seed is used when empty.
    pub room: String,
    /// Connection status.
    pub status: OnlineStatus,
    /// Peers seen in sync messages.
    pub peers: Vec<String>,
    /// Recent chat and system lines.
    pub log: Vec<ChatLine>,
}

impl Default for OnlineState {
    fn default() -> Self {
        Self {
            enabled: false,
            url: ONLINE_DEFAULT_URL.to_string(),
            room: String::new(),
            status: OnlineStatus::Offline,
            peers: Vec::new(),
            log: Vec::new(),
        }
    }
}

impl OnlineState {
    /// Append a chat line, keeping the most recent lines.
    pub fn push_line(&mut self, sender: impl Into<String>, message: impl Into<String>) {
        self.log.push(ChatLine {
            sender: sender.into(),
            message: message.into(),
        });
        if self.log.len() > ONLINE_LOG_CAPACITY {
            let excess = self.log.len() - ONLINE_LOG_CAPACITY;
            self.log.drain(..excess);
        }
    }
}

// =============================================================================
// GAME STATE
// =============================================================================

/// Complete persisted game state.
///
/// The single mutable root: engine functions take `&mut GameState` and
/// nothing else holds references into it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Player profile.
    #[serde(default)]
    pub profile: Profile,

    /// Seed position (`seedHash` and `cursor` at the top level of saves).
    #[serde(flatten)]
    pub rng: SeedState,

    /// Wallet.
    #[serde(default)]
    pub currencies: Currencies,

    /// VIP widens the rarity roll in the player's favor.
    #[serde(default)]
    pub vip: bool,

    /// Consecutive commons pulled.
    #[serde(default)]
    pub pity: u32,

    /// Owned card counts.
    #[serde(default)]
    pub collection: Collection,

    /// Deck card ids.
    #[serde(default)]
    pub deck: Vec<String>,

    /// Active run, if any.
    #[serde(default)]
    pub run: Option<Run>,

    /// Relay sub-state.
    #[serde(default)]
    pub online: OnlineState,

    /// Pull history.
    #[serde(default)]
    pub gacha_log: Vec<GachaRecord>,

    /// Activity log, most recent last.
    #[serde(default)]
    pub log: Vec<LogEntry>,
}

impl GameState {
    /// Fresh state with a generated seed.
    pub fn new(rules: &Rules) -> Self {
        Self::with_seed(rules, &generate_seed())
    }

    /// Fresh state on a given seed.
    pub fn with_seed(rules: &Rules, seed: &str) -> Self {
        Self {
            profile: Profile {
                seed: seed.to_string(),
                ..Profile::default()
            },
            rng: SeedState::from_seed(seed),
            currencies: rules.starting_currencies,
            vip: false,
            pity: 0,
            collection: starter_collection(rules),
            deck: rules.starter_deck.clone(),
            run: None,
            online: OnlineState::default(),
            gacha_log: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Switch to a new seed string and reset the cursor.
    pub fn reseed(&mut self, seed: &str) {
        self.profile.seed = seed.to_string();
        self.rng.reseed(seed);
    }

    /// Append to the activity log, keeping the most recent entries.
    pub fn add_log(&mut self, entry: LogEntry) {
        self.log.push(entry);
        if self.log.len() > LOG_CAPACITY {
            let excess = self.log.len() - LOG_CAPACITY;
            self.log.drain(..excess);
        }
    }

    /// Flip the VIP flag.
    pub fn toggle_vip(&mut self) -> bool {
        self.vip = !self.vip;
        self.vip
    }

    /// Relay room: the explicit room, else the seed.
    pub fn relay_room(&self) -> &str {
        if self.online.room.is_empty() {
            &self.profile.seed
        } else {
            &self.online.room
        }
    }

    /// Whether a run is active and still running.
    pub fn has_active_run(&self) -> bool {
        self.run.as_ref().is_some_and(|run| run.is_running())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cost(pairs: &[(Currency, u64)]) -> BTreeMap<Currency, u64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_fresh_state() {
        let rules = Rules::default();
        let state = GameState::with_seed(&rules, "HALO-TEST1");

        assert_eq!(state.profile.seed, "HALO-TEST1");
        assert_eq!(state.rng.cursor(), 1);
        assert_eq!(state.currencies.credits, 1200);
        assert_eq!(state.currencies.embers, 220);
        assert_eq!(state.currencies.shards, 1);
        assert_eq!(state.deck.len(), 6);
        assert!(state.run.is_none());
    }

    #[test]
    fn test_try_debit_is_all_or_nothing() {
        let mut wallet = Currencies { credits: 300, embers: 10, shards: 0 };
        let price = cost(&[(Currency::Credits, 250), (Currency::Embers, 20)]);

        assert_eq!(wallet.try_debit(&price), Err(Currency::Embers));
        assert_eq!(wallet, Currencies { credits: 300, embers: 10, shards: 0 });

        let price = cost(&[(Currency::Credits, 250), (Currency::Embers, 10)]);
        assert_eq!(wallet.try_debit(&price), Ok(()));
        assert_eq!(wallet, Currencies { credits: 50, embers: 0, shards: 0 });
    }

    #[test]
    fn test_shortfall_reports_first_currency_in_order() {
        let wallet = Currencies::default();
        let price = cost(&[(Currency::Shards, 1), (Currency::Credits, 1)]);
        assert_eq!(wallet.first_shortfall(&price), Some(Currency::Credits));
    }

    #[test]
    fn test_log_is_bounded() {
        let rules = Rules::default();
        let mut state = GameState::with_seed(&rules, "log");
        for i in 0..(LOG_CAPACITY + 30) {
            state.add_log(LogEntry::new(LogKind::Card, format!("entry {}", i), ""));
        }
        assert_eq!(state.log.len(), LOG_CAPACITY);
        assert_eq!(state.log[0].title, "entry 30");
    }

    #[test]
    fn test_reseed_resets_cursor() {
        let rules = Rules::default();
        let mut state = GameState::with_seed(&rules, "first");
        state.rng.next();
        state.reseed("second");
        assert_eq!(state.profile.seed, "second");
        assert_eq!(state.rng.cursor(), 1);
    }

    #[test]
    fn test_relay_room_falls_back_to_seed() {
        let rules = Rules::default();
        let mut state = GameState::with_seed(&rules, "HALO-ROOM01");
        assert_eq!(state.relay_room(), "HALO-ROOM01");
        state.online.room = "friends".to_string();
        assert_eq!(state.relay_room(), "friends");
    }

    #[test]
    fn test_save_shape_is_flat() {
        let rules = Rules::default();
        let state = GameState::with_seed(&rules, "shape");
        let value = serde_json::to_value(&state).unwrap();
        assert!(value.get("seedHash").is_some());
        assert!(value.get("cursor").is_some());
        assert!(value.get("gachaLog").is_some());

        let back: GameState = serde_json::from_value(value).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_toggle_vip() {
        let rules = Rules::default();
        let mut state = GameState::with_seed(&rules, "vip");
        assert!(state.toggle_vip());
        assert!(!state.toggle_vip());
    }
}
