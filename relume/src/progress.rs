use crate::models::Light;
use crate::{BoundingBox, QuadImage, REFINEMENT_STEPS};

/// How much of a light's contribution the engine currently holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProgressState {
    /// Nothing is known about this light yet.
    #[default]
    New,

    /// Results existed but were thrown away because the inputs changed.
    NoResults,

    /// Some refinement passes are folded in, but not all of them.
    Partial,

    /// Every pass is done; nothing left to compute.
    Full,
}

/// Per-light incremental bookkeeping.
///
/// Records live in the engine's arena keyed by `LightId` and survive
/// light-list replacements, so a light that was bright before an edit keeps
/// its priority hint (`total_contribution`, `last_nonzero_tick`) even after
/// its actual results are discarded.
#[derive(Debug, Default)]
pub struct LightProgress {
    state: ProgressState,
    level: usize,
    contribution: QuadImage,
    total_contribution: f32,
    last_nonzero_tick: u64,
    distance_to_eye: f32,
}

impl LightProgress {
    pub fn state(&self) -> ProgressState {
        self.state
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn contribution(&self) -> &QuadImage {
        &self.contribution
    }

    pub fn total_contribution(&self) -> f32 {
        self.total_contribution
    }

    pub fn last_nonzero_tick(&self) -> u64 {
        self.last_nonzero_tick
    }

    pub fn distance_to_eye(&self) -> f32 {
        self.distance_to_eye
    }

    pub fn set_distance_to_eye(&mut self, distance: f32) {
        self.distance_to_eye = distance;
    }

    pub fn has_work(&self) -> bool {
        self.state != ProgressState::Full
    }

    /// Throws the computed matrix away, keeping the brightness and recency
    /// hints for priority. A light that never entered the kernel stays new.
    pub fn discard(&mut self) {
        self.contribution.release();

        if self.state != ProgressState::New {
            self.state = ProgressState::NoResults;
        }
    }

    /// Makes sure the contribution matrix covers the current image size.
    /// Returns false when the allocation fails.
    pub fn prepare_contribution(&mut self, width: usize, height: usize) -> bool {
        self.contribution.try_resize(width, height).is_ok()
    }

    pub fn contribution_mut(&mut self) -> &mut QuadImage {
        &mut self.contribution
    }

    /// Folds one finished kernel pass in: a zero total releases the matrix
    /// (zero-magnitude results are not worth their memory), a nonzero one
    /// stamps the recency tick.
    pub fn record_pass(&mut self, level: usize, total: f32, tick: u64) {
        self.total_contribution = total;

        if total == 0.0 {
            self.contribution.release();
        } else {
            self.last_nonzero_tick = tick;
        }

        self.advance_level(level);
    }

    /// Moves to `level` without touching the results; used when a pass
    /// selects no rows at all for the current image height.
    pub fn advance_level(&mut self, level: usize) {
        self.level = level;

        self.state = if level == REFINEMENT_STEPS - 1 {
            ProgressState::Full
        } else {
            ProgressState::Partial
        };
    }

    /// Downgrades after a failed contribution-matrix allocation; the light
    /// won't look interesting again until the next discard.
    pub fn fail_allocation(&mut self) {
        self.contribution.release();
        self.total_contribution = 0.0;
        self.state = ProgressState::NoResults;
    }

    /// Whether this light should pre-empt everything that isn't: a light the
    /// engine knows nothing about yet, sitting inside the view volume.
    /// Directional lights are excluded; their position is conceptually at
    /// infinity, and their zero eye distance boosts them already.
    pub fn is_high_priority(&self, light: &Light, scene_bounds: &BoundingBox) -> bool {
        self.state == ProgressState::New
            && !light.is_directional()
            && scene_bounds.contains(light.position)
    }

    /// The scheduling order: true iff `other` should run before `self`.
    ///
    /// Ties resolve to false on both sides, which keeps the selection stable
    /// in light-list order.
    pub fn lower_priority_than(
        &self,
        light: &Light,
        other: &LightProgress,
        other_light: &Light,
        scene_bounds: &BoundingBox,
    ) -> bool {
        let high = self.is_high_priority(light, scene_bounds);
        let other_high = other.is_high_priority(other_light, scene_bounds);

        if high != other_high {
            return other_high;
        }

        let dark = self.total_contribution == 0.0;
        let other_dark = other.total_contribution == 0.0;

        use ProgressState as S;

        match (self.state, other.state) {
            // Full lights have no work and are never candidates
            (S::Full, _) | (_, S::Full) => false,

            (S::New, S::New) => self.distance_to_eye > other.distance_to_eye,

            // An unknown light loses to one that is known to contribute
            (S::New, S::NoResults) => !other_dark,
            (S::NoResults, S::New) => dark,

            // A light mid-refinement beats an unknown one
            (S::New, S::Partial) => true,
            (S::Partial, S::New) => false,

            (S::Partial, S::Partial) => {
                if dark && other_dark {
                    return other.last_nonzero_tick > self.last_nonzero_tick;
                }

                if dark != other_dark {
                    return dark;
                }

                if self.level.abs_diff(other.level) <= 1 {
                    return self.total_contribution < other.total_contribution;
                }

                // Far-apart refinement levels: least refined first
                self.level > other.level
            }

            (S::Partial, S::NoResults) => {
                if !other_dark {
                    return true;
                }

                if dark && other_dark {
                    return other.last_nonzero_tick > self.last_nonzero_tick;
                }

                self.total_contribution < other.total_contribution
            }

            (S::NoResults, S::Partial) => {
                if !dark {
                    return false;
                }

                if dark && other_dark {
                    return other.last_nonzero_tick > self.last_nonzero_tick;
                }

                self.total_contribution < other.total_contribution
            }

            (S::NoResults, S::NoResults) => {
                if dark && other_dark {
                    return other.last_nonzero_tick > self.last_nonzero_tick;
                }

                self.total_contribution < other.total_contribution
            }
        }
    }
}
