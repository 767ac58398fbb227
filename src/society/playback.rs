use log::{debug, info};

use super::model::{Frame, PlaybackRun};

pub const MIN_SPEED: f64 = 0.25;
pub const MAX_SPEED: f64 = 8.0;

/// Owns a run and the cursor into it.
///
/// The run is never mutated; only the cursor moves. All moves clamp to
/// `[0, frame_count - 1]` and the timer stops at the last frame.
#[derive(Clone, Debug)]
pub struct Playback {
	run: PlaybackRun,
	index: usize,
	playing: bool,
	speed: f64,
	/// Milliseconds per frame at speed 1.
	interval_ms: f64,
	elapsed_ms: f64,
}

impl Playback {
	pub fn new(run: PlaybackRun, interval_ms: f64) -> Self {
		info!("playback loaded: {} ({} frames)", run.id, run.len());
		Self {
			run,
			index: 0,
			playing: false,
			speed: 1.0,
			interval_ms: interval_ms.max(1.0),
			elapsed_ms: 0.0,
		}
	}

	pub fn run(&self) -> &PlaybackRun {
		&self.run
	}

	pub fn index(&self) -> usize {
		self.index
	}

	pub fn frame_count(&self) -> usize {
		self.run.len()
	}

	pub fn current_frame(&self) -> Option<&Frame> {
		self.run.frame(self.index)
	}

	pub fn is_playing(&self) -> bool {
		self.playing
	}

	pub fn speed(&self) -> f64 {
		self.speed
	}

	fn last(&self) -> usize {
		self.frame_count().saturating_sub(1)
	}

	pub fn at_end(&self) -> bool {
		self.index >= self.last()
	}

	/// Start the timer; restarts from frame 0 when parked on the last frame.
	pub fn play(&mut self) {
		if self.frame_count() < 2 {
			return;
		}
		if self.at_end() {
			self.index = 0;
		}
		self.elapsed_ms = 0.0;
		self.playing = true;
	}

	pub fn pause(&mut self) {
		self.playing = false;
	}

	pub fn toggle(&mut self) {
		if self.playing {
			self.pause();
		} else {
			self.play();
		}
	}

	pub fn set_speed(&mut self, speed: f64) {
		if speed.is_finite() {
			self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
		}
	}

	pub fn seek(&mut self, index: usize) {
		self.index = index.min(self.last());
		self.elapsed_ms = 0.0;
	}

	pub fn step_forward(&mut self) {
		self.seek(self.index + 1);
	}

	pub fn step_back(&mut self) {
		self.seek(self.index.saturating_sub(1));
	}

	/// Advance by wall-clock `dt_ms`; returns whether the frame changed.
	pub fn tick(&mut self, dt_ms: f64) -> bool {
		if !self.playing || !dt_ms.is_finite() || dt_ms <= 0.0 {
			return false;
		}
		self.elapsed_ms += dt_ms;
		let per_frame = self.interval_ms / self.speed;
		let steps = (self.elapsed_ms / per_frame).floor() as usize;
		if steps == 0 {
			return false;
		}
		self.elapsed_ms -= steps as f64 * per_frame;

		let before = self.index;
		self.index = self.index.saturating_add(steps).min(self.last());
		if self.at_end() {
			self.playing = false;
			debug!("playback reached last frame {}", self.index);
		}
		self.index != before
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn run(frames: usize) -> PlaybackRun {
		PlaybackRun {
			id: "r".into(),
			frames: (0..frames)
				.map(|t| Frame {
					t,
					..Default::default()
				})
				.collect(),
			..Default::default()
		}
	}

	#[test]
	fn tick_advances_by_interval_and_speed() {
		let mut p = Playback::new(run(10), 100.0);
		assert!(!p.tick(500.0));
		p.play();
		assert!(!p.tick(50.0));
		assert!(p.tick(60.0));
		assert_eq!(p.index(), 1);
		p.set_speed(2.0);
		assert!(p.tick(100.0));
		assert_eq!(p.index(), 3);
		assert_eq!(p.current_frame().map(|f| f.t), Some(3));
	}

	#[test]
	fn huge_elapsed_time_lands_on_last_frame() {
		let mut p = Playback::new(run(5), 100.0);
		p.play();
		p.step_forward();
		assert!(p.tick(1e300));
		assert_eq!(p.index(), 4);
		assert!(!p.is_playing());
	}

	#[test]
	fn stops_at_last_frame() {
		let mut p = Playback::new(run(4), 100.0);
		p.play();
		p.tick(10_000.0);
		assert_eq!(p.index(), 3);
		assert!(!p.is_playing());
		assert!(!p.tick(100.0));
		p.play();
		assert_eq!(p.index(), 0);
		assert!(p.is_playing());
	}

	#[test]
	fn seek_and_step_clamp() {
		let mut p = Playback::new(run(5), 100.0);
		p.seek(99);
		assert_eq!(p.index(), 4);
		p.step_forward();
		assert_eq!(p.index(), 4);
		p.seek(0);
		p.step_back();
		assert_eq!(p.index(), 0);
		p.step_forward();
		assert_eq!(p.index(), 1);
	}

	#[test]
	fn speed_is_clamped() {
		let mut p = Playback::new(run(3), 100.0);
		p.set_speed(100.0);
		assert_eq!(p.speed(), MAX_SPEED);
		p.set_speed(0.0);
		assert_eq!(p.speed(), MIN_SPEED);
		p.set_speed(f64::NAN);
		assert_eq!(p.speed(), MIN_SPEED);
	}

	#[test]
	fn empty_run_never_plays() {
		let mut p = Playback::new(run(0), 100.0);
		p.play();
		assert!(!p.is_playing());
		assert!(p.current_frame().is_none());
		p.step_forward();
		assert_eq!(p.index(), 0);
	}
}
