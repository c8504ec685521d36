//! Locale tables for player-facing text.
//!
//! The core never renders anything, but effect messages, challenge
//! prompts, and oracle fallback strings are locale-dependent data the
//! presentation layer reads through here.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Supported languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    /// English.
    En,
    /// Spanish.
    Es,
}

impl Default for Language {
    fn default() -> Self {
        Language::En
    }
}

/// Key identifying one localized effect message.
///
/// The slot is the catalog index of the effect the message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKey {
    /// Message bound to a reward catalog entry.
    Reward(usize),
    /// Message bound to a penalty catalog entry.
    Penalty(usize),
}

const REWARD_EN: [&str; 5] = [
    "Lucky break! Move forward 3 spaces.",
    "You found a shortcut! Advance 2 spaces.",
    "Creative boost! Roll the dice again.",
    "Good karma! Move forward 1 space.",
    "Team up! Choose another player to move forward 1 space with you.",
];

const REWARD_ES: [&str; 5] = [
    "\u{a1}Golpe de suerte! Avanza 3 casillas.",
    "\u{a1}Encontraste un atajo! Avanza 2 casillas.",
    "\u{a1}Impulso creativo! Lanza el dado de nuevo.",
    "\u{a1}Buen karma! Avanza 1 casilla.",
    "\u{a1}En equipo! Elige a otro jugador para avanzar 1 casilla contigo.",
];

const PENALTY_EN: [&str; 5] = [
    "Oops! A banana peel... Go back 2 spaces.",
    "Brain freeze! Miss your next turn.",
    "Oh no, a trap door! Go back 3 spaces.",
    "You must speak like a pirate until your next turn!",
    "A sudden gust of wind blows you back 1 space.",
];

const PENALTY_ES: [&str; 5] = [
    "\u{a1}Uy! Una c\u{e1}scara de pl\u{e1}tano... Retrocede 2 casillas.",
    "\u{a1}Cerebro congelado! Pierdes tu pr\u{f3}ximo turno.",
    "\u{a1}Oh no, una trampilla! Retrocede 3 casillas.",
    "\u{a1}Debes hablar como un pirata hasta tu pr\u{f3}ximo turno!",
    "Una r\u{e1}faga de viento te empuja 1 casilla hacia atr\u{e1}s.",
];

impl MessageKey {
    /// Returns the localized message text.
    ///
    /// Catalog slots wrap, so a key built from any occurrence counter
    /// resolves to a real message.
    pub fn text(self, language: Language) -> &'static str {
        match (self, language) {
            (MessageKey::Reward(slot), Language::En) => REWARD_EN[slot % REWARD_EN.len()],
            (MessageKey::Reward(slot), Language::Es) => REWARD_ES[slot % REWARD_ES.len()],
            (MessageKey::Penalty(slot), Language::En) => PENALTY_EN[slot % PENALTY_EN.len()],
            (MessageKey::Penalty(slot), Language::Es) => PENALTY_ES[slot % PENALTY_ES.len()],
        }
    }
}

impl Language {
    /// Fallback challenge used when no oracle credential is configured.
    pub fn fallback_no_credential(self) -> &'static str {
        match self {
            Language::En => "Pretend to be a T-Rex until your next turn.",
            Language::Es => "Finge ser un T-Rex hasta tu pr\u{f3}ximo turno.",
        }
    }

    /// Fallback challenge used when an oracle request fails or returns
    /// an empty response.
    pub fn fallback_request_failed(self) -> &'static str {
        match self {
            Language::En => "Do your best robot dance for 15 seconds!",
            Language::Es => "\u{a1}Baila tu mejor baile de robot durante 15 segundos!",
        }
    }

    /// Builds the oracle prompt for a challenge tailored to the player's age.
    pub fn challenge_prompt(self, age: u8) -> String {
        match self {
            Language::En => format!(
                "Generate a single, short, fun, and creative physical challenge \
                 for a {age}-year-old person to perform indoors. The challenge \
                 should be safe and possible to complete in under a minute. It \
                 should not require any special props other than common household \
                 items. Make it one sentence and reply in English."
            ),
            Language::Es => format!(
                "Genera un \u{fa}nico, corto, divertido y creativo reto f\u{ed}sico para \
                 una persona de {age} a\u{f1}os para realizar en interiores. El reto \
                 debe ser seguro y posible de completar en menos de un minuto. No \
                 debe requerir ning\u{fa}n accesorio especial que no sean objetos \
                 dom\u{e9}sticos comunes. Hazlo en una sola frase y responde en Espa\u{f1}ol."
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn language_parses_from_string() {
        assert_eq!(Language::from_str("en").unwrap(), Language::En);
        assert_eq!(Language::from_str("es").unwrap(), Language::Es);
        assert!(Language::from_str("fr").is_err());
    }

    #[test]
    fn message_keys_resolve_in_both_languages() {
        for slot in 0..5 {
            for language in [Language::En, Language::Es] {
                assert!(!MessageKey::Reward(slot).text(language).is_empty());
                assert!(!MessageKey::Penalty(slot).text(language).is_empty());
            }
        }
    }

    #[test]
    fn prompt_embeds_age() {
        assert!(Language::En.challenge_prompt(9).contains("9-year-old"));
        assert!(Language::Es.challenge_prompt(41).contains("41"));
    }
}
