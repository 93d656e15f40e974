/// Per-episode return bookkeeping.
#[derive(Debug, Clone)]
pub struct EpisodeStats {
    pub episodes: u32,
    pub steps: u64,
    pub current_return: f32,
    pub best_return: Option<f32>,
    pub recent: Vec<f32>,
    window: usize,
}

impl EpisodeStats {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            episodes: 0,
            steps: 0,
            current_return: 0.0,
            best_return: None,
            recent: Vec::with_capacity(window),
            window,
        }
    }

    pub fn record_step(&mut self, reward: f32) {
        self.steps += 1;
        self.current_return += reward;
    }

    /// Close the running episode and return its total reward.
    pub fn finish_episode(&mut self) -> f32 {
        let ret = self.current_return;
        self.current_return = 0.0;
        self.episodes += 1;

        self.recent.push(ret);
        if self.recent.len() > self.window {
            self.recent.remove(0);
        }
        self.best_return = Some(self.best_return.map_or(ret, |b| b.max(ret)));
        ret
    }

    /// Mean return over the last `window` finished episodes.
    pub fn recent_mean(&self) -> Option<f32> {
        if self.recent.is_empty() {
            return None;
        }
        Some(self.recent.iter().sum::<f32>() / self.recent.len() as f32)
    }
}

impl Default for EpisodeStats {
    fn default() -> Self {
        Self::new(10)
    }
}
