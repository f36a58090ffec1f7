// Quote Pool Module
// Loads the canned quotes that completion requests are answered with.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Number of samples loaded for every theme
pub const SAMPLES_PER_THEME: usize = 10;

/// Quote theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    StarWars,
    Computer,
    RickAndMorty,
    GameOfThrones,
    Lotr,
    Matrix,
}

impl Theme {
    pub const ALL: [Theme; 6] = [
        Theme::StarWars,
        Theme::Computer,
        Theme::RickAndMorty,
        Theme::GameOfThrones,
        Theme::Lotr,
        Theme::Matrix,
    ];

    /// Human readable name, as shown in the startup banner
    pub fn display_name(&self) -> &'static str {
        match self {
            Theme::StarWars => "Star Wars",
            Theme::Computer => "Computer",
            Theme::RickAndMorty => "Rick & Morty",
            Theme::GameOfThrones => "GoT",
            Theme::Lotr => "LOTR",
            Theme::Matrix => "Matrix",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::StarWars => "star_wars",
            Theme::Computer => "computer",
            Theme::RickAndMorty => "rick_and_morty",
            Theme::GameOfThrones => "game_of_thrones",
            Theme::Lotr => "lotr",
            Theme::Matrix => "matrix",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while loading the quote pool
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("Quote source '{source_name}' is unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },
    #[error("Quote source produced an empty sample for theme '{0}'")]
    EmptySample(Theme),
}

/// Supplier of short text samples per theme
pub trait QuoteSource: Send {
    /// Produce one sample for the given theme
    fn sample(&mut self, theme: Theme) -> Result<String, QuoteError>;

    /// Get a name for this source (for logging/debugging)
    fn name(&self) -> &str;
}

/// Draws samples from built-in word lists
pub struct WordListSource<R: Rng = StdRng> {
    rng: R,
}

impl WordListSource<StdRng> {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible source, useful for tests and `quotes.seed`
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for WordListSource<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> WordListSource<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    const STAR_WARS: &'static [&'static str] = &[
        "Luke Skywalker",
        "Darth Vader",
        "Leia Organa",
        "Han Solo",
        "Obi-Wan Kenobi",
        "Yoda",
        "Chewbacca",
        "Lando Calrissian",
        "Padmé Amidala",
        "Mace Windu",
        "Boba Fett",
        "Kylo Ren",
        "Rey",
        "Poe Dameron",
        "Ahsoka Tano",
    ];

    const COMPUTER_PLATFORMS: &'static [&'static str] = &[
        "Linux",
        "macOS",
        "Windows",
        "Chrome OS",
        "FreeBSD",
        "OpenBSD",
        "Android",
        "iOS",
        "Solaris",
        "Windows Server",
    ];

    const RICK_AND_MORTY: &'static [&'static str] = &[
        "Rick Sanchez",
        "Morty Smith",
        "Summer Smith",
        "Beth Smith",
        "Jerry Smith",
        "Mr. Meeseeks",
        "Birdperson",
        "Squanchy",
        "Mr. Poopybutthole",
        "Evil Morty",
        "Unity",
        "Krombopulos Michael",
    ];

    const GAME_OF_THRONES: &'static [&'static str] = &[
        "Jon Snow",
        "Daenerys Targaryen",
        "Tyrion Lannister",
        "Cersei Lannister",
        "Arya Stark",
        "Sansa Stark",
        "Bran Stark",
        "Jaime Lannister",
        "Brienne of Tarth",
        "Petyr Baelish",
        "Samwell Tarly",
        "Sandor Clegane",
    ];

    const LOTR: &'static [&'static str] = &[
        "Frodo Baggins",
        "Samwise Gamgee",
        "Gandalf",
        "Aragorn",
        "Legolas",
        "Gimli",
        "Boromir",
        "Meriadoc Brandybuck",
        "Peregrin Took",
        "Galadriel",
        "Elrond",
        "Saruman",
        "Gollum",
    ];

    const FIRST_NAMES: &'static [&'static str] = &[
        "Thomas", "Trinity", "Alice", "Marcus", "Grace", "Victor", "Nina", "Oscar", "Lena",
        "Hugo", "Maya", "Felix",
    ];

    const LAST_NAMES: &'static [&'static str] = &[
        "Anderson", "Reeves", "Moss", "Fishburne", "Weaving", "Pantoliano", "Foster", "Kowalski",
        "Nakamura", "Okafor", "Lindqvist", "Moreau",
    ];

    fn pick(
        &mut self,
        theme: Theme,
        words: &'static [&'static str],
    ) -> Result<&'static str, QuoteError> {
        words
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| QuoteError::SourceUnavailable {
                source_name: "wordlist".to_string(),
                reason: format!("no words available for theme '{}'", theme),
            })
    }
}

impl<R: Rng + Send> QuoteSource for WordListSource<R> {
    fn sample(&mut self, theme: Theme) -> Result<String, QuoteError> {
        let sample = match theme {
            Theme::StarWars => self.pick(theme, Self::STAR_WARS)?.to_string(),
            Theme::Computer => self.pick(theme, Self::COMPUTER_PLATFORMS)?.to_string(),
            Theme::RickAndMorty => self.pick(theme, Self::RICK_AND_MORTY)?.to_string(),
            Theme::GameOfThrones => self.pick(theme, Self::GAME_OF_THRONES)?.to_string(),
            Theme::Lotr => self.pick(theme, Self::LOTR)?.to_string(),
            Theme::Matrix => {
                let first = self.pick(theme, Self::FIRST_NAMES)?;
                let last = self.pick(theme, Self::LAST_NAMES)?;
                format!("The Matrix {} {}", first, last)
            }
        };
        Ok(sample)
    }

    fn name(&self) -> &str {
        "wordlist"
    }
}

/// Immutable theme -> samples mapping, loaded once at startup
#[derive(Debug, Clone)]
pub struct QuotePool {
    quotes: BTreeMap<Theme, Vec<String>>,
}

impl QuotePool {
    /// Load [`SAMPLES_PER_THEME`] samples for every theme from `source`
    pub fn load(source: &mut dyn QuoteSource) -> Result<Self, QuoteError> {
        let mut quotes = BTreeMap::new();

        for theme in Theme::ALL {
            let mut samples = Vec::with_capacity(SAMPLES_PER_THEME);
            for _ in 0..SAMPLES_PER_THEME {
                let sample = source.sample(theme)?;
                if sample.trim().is_empty() {
                    return Err(QuoteError::EmptySample(theme));
                }
                samples.push(sample);
            }
            quotes.insert(theme, samples);
        }

        tracing::debug!(
            source = source.name(),
            themes = quotes.len(),
            per_theme = SAMPLES_PER_THEME,
            "Quote pool loaded"
        );

        Ok(Self { quotes })
    }

    /// Samples for a theme, in load order
    pub fn samples(&self, theme: Theme) -> &[String] {
        self.quotes.get(&theme).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn themes(&self) -> impl Iterator<Item = Theme> + '_ {
        self.quotes.keys().copied()
    }

    pub fn samples_per_theme(&self) -> usize {
        SAMPLES_PER_THEME
    }
}
