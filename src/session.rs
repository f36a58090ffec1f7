// Stream Session Module
// Per-request selection of theme, sample and speed.

use crate::chunker;
use crate::quotes::{QuotePool, Theme};
use crate::speed::{SpeedLabel, SpeedProfile, SpeedTable};
use crate::stream::ChunkEmitterBuilder;
use rand::seq::IndexedRandom;
use rand::Rng;

/// Selections made once for a single completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSession {
    pub id: String,
    pub theme: Theme,
    pub sample: String,
    pub speed_label: SpeedLabel,
    pub speed: SpeedProfile,
}

impl StreamSession {
    pub fn new(
        theme: Theme,
        sample: impl Into<String>,
        speed_label: SpeedLabel,
        speed: SpeedProfile,
    ) -> Self {
        Self {
            id: format!("chatcmpl-{}", uuid::Uuid::new_v4()),
            theme,
            sample: sample.into(),
            speed_label,
            speed,
        }
    }

    /// Draw theme, sample and speed label independently and uniformly from `rng`
    pub fn pick<R: Rng>(pool: &QuotePool, speeds: &SpeedTable, rng: &mut R) -> Self {
        let theme = Theme::ALL[rng.random_range(0..Theme::ALL.len())];
        let sample = pool
            .samples(theme)
            .choose(rng)
            .cloned()
            .unwrap_or_default();
        let speed_label = SpeedLabel::ALL[rng.random_range(0..SpeedLabel::ALL.len())];
        let speed = speeds.resolve(speed_label, rng);

        Self::new(theme, sample, speed_label, speed)
    }

    pub fn fragments(&self) -> Vec<String> {
        chunker::chunk(&self.sample)
    }

    /// Emitter builder preloaded with this session's id, fragments and speed
    pub fn emitter(&self) -> ChunkEmitterBuilder {
        ChunkEmitterBuilder::new(self.fragments())
            .id(self.id.clone())
            .speed(self.speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotes::{QuoteError, QuoteSource, SAMPLES_PER_THEME};
    use crate::stream::StreamEvent;
    use futures::StreamExt;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    struct NumberedSource {
        next: usize,
    }

    impl QuoteSource for NumberedSource {
        fn sample(&mut self, theme: Theme) -> Result<String, QuoteError> {
            self.next += 1;
            Ok(format!("{} quote {}", theme, self.next))
        }

        fn name(&self) -> &str {
            "numbered"
        }
    }

    fn pool() -> QuotePool {
        QuotePool::load(&mut NumberedSource { next: 0 }).unwrap()
    }

    #[test]
    fn test_pick_is_deterministic_for_seed() {
        let pool = pool();
        let speeds = SpeedTable::new(&mut StdRng::seed_from_u64(1));

        let a = StreamSession::pick(&pool, &speeds, &mut StdRng::seed_from_u64(9));
        let b = StreamSession::pick(&pool, &speeds, &mut StdRng::seed_from_u64(9));

        assert_eq!(a.theme, b.theme);
        assert_eq!(a.sample, b.sample);
        assert_eq!(a.speed_label, b.speed_label);
        assert_eq!(a.speed, b.speed);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_pick_draws_from_pool() {
        let pool = pool();
        let speeds = SpeedTable::new(&mut StdRng::seed_from_u64(1));
        let mut rng = StdRng::seed_from_u64(2024);

        let mut themes = HashSet::new();
        let mut labels = HashSet::new();
        for _ in 0..600 {
            let session = StreamSession::pick(&pool, &speeds, &mut rng);
            assert!(pool.samples(session.theme).contains(&session.sample));
            assert_eq!(session.speed, speeds.get(session.speed_label));
            themes.insert(session.theme);
            labels.insert(session.speed_label);
        }

        assert_eq!(themes.len(), Theme::ALL.len());
        assert_eq!(labels.len(), SpeedLabel::ALL.len());
        assert_eq!(pool.samples(Theme::Lotr).len(), SAMPLES_PER_THEME);
    }

    #[tokio::test]
    async fn test_session_streams_its_sample() {
        let session = StreamSession::new(
            Theme::Matrix,
            "The Matrix Neo",
            SpeedLabel::Superfast,
            SpeedProfile::instant(),
        );

        let events: Vec<StreamEvent> = session.emitter().build().into_event_stream().collect().await;

        assert_eq!(events.len(), 4);
        assert_eq!(events[0], StreamEvent::Delta("The ".to_string()));
        assert_eq!(events[3], StreamEvent::Finish("stop".to_string()));
    }
}
