use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::library::{Catalog, Song, fallback_catalog};

/// Shared view into what the fake output did.
#[derive(Default)]
struct Probe {
    log: Vec<String>,
    live_handles: usize,
    max_live_handles: usize,
    statuses: VecDeque<PlaybackStatus>,
}

type SharedProbe = Rc<RefCell<Probe>>;

struct FakeOutput {
    probe: SharedProbe,
    fail: bool,
    duration_ms: Option<u64>,
}

struct FakeHandle {
    uri: String,
    probe: SharedProbe,
}

impl AudioOutput for FakeOutput {
    fn create(
        &mut self,
        uri: &str,
        autoplay: bool,
    ) -> Result<(Box<dyn OutputHandle>, PlaybackStatus), OutputError> {
        if self.fail {
            return Err(OutputError::Unavailable("test".into()));
        }
        let mut p = self.probe.borrow_mut();
        p.log.push(format!("create {uri}"));
        p.live_handles += 1;
        p.max_live_handles = p.max_live_handles.max(p.live_handles);
        let status = PlaybackStatus {
            duration_ms: self.duration_ms,
            is_playing: autoplay,
            is_loaded: true,
            ..PlaybackStatus::default()
        };
        let handle = FakeHandle {
            uri: uri.to_string(),
            probe: self.probe.clone(),
        };
        Ok((Box::new(handle), status))
    }
}

impl OutputHandle for FakeHandle {
    fn pause(&mut self) -> Result<(), OutputError> {
        self.probe.borrow_mut().log.push(format!("pause {}", self.uri));
        Ok(())
    }

    fn resume(&mut self) -> Result<(), OutputError> {
        self.probe.borrow_mut().log.push(format!("resume {}", self.uri));
        Ok(())
    }

    fn seek(&mut self, position_ms: u64) -> Result<(), OutputError> {
        self.probe
            .borrow_mut()
            .log
            .push(format!("seek {} {position_ms}", self.uri));
        Ok(())
    }

    fn poll_status(&mut self) -> Option<PlaybackStatus> {
        self.probe.borrow_mut().statuses.pop_front()
    }

    fn release(self: Box<Self>) {
        let mut p = self.probe.borrow_mut();
        p.log.push(format!("release {}", self.uri));
        p.live_handles -= 1;
    }
}

fn transport_with(fail: bool, duration_ms: Option<u64>) -> (Transport, SharedProbe) {
    let probe: SharedProbe = Rc::new(RefCell::new(Probe::default()));
    let output = FakeOutput {
        probe: probe.clone(),
        fail,
        duration_ms,
    };
    (
        Transport::with_rng(Box::new(output), StdRng::seed_from_u64(7)),
        probe,
    )
}

fn synthetic_transport() -> Transport {
    transport_with(false, None).0
}

fn real_song(id: &str, secs: u64) -> Song {
    Song {
        id: id.into(),
        uri: format!("/music/{id}.mp3"),
        title: id.into(),
        artist: "A".into(),
        album: "B".into(),
        duration: Duration::from_secs(secs),
        filename: Some(format!("{id}.mp3")),
    }
}

fn synthetic_song(id: &str, secs: u64) -> Song {
    Song {
        uri: String::new(),
        filename: None,
        ..real_song(id, secs)
    }
}

/// Advance the ticker by `secs` seconds, one second at a time.
fn run_ticks(t: &mut Transport, catalog: &Catalog, start: Instant, secs: u64) -> Instant {
    // First poll only fixes the time base.
    t.tick(start, catalog);
    let mut now = start;
    for _ in 0..secs {
        now += Duration::from_secs(1);
        t.tick(now, catalog);
    }
    now
}

#[test]
fn new_transport_is_idle() {
    let t = synthetic_transport();
    let s = t.state();
    assert!(s.current_song.is_none());
    assert!(!s.is_playing);
    assert_eq!(s.progress, Duration::ZERO);
    assert_eq!(s.repeat_mode, RepeatMode::Off);
    assert!(!s.is_shuffle);
}

#[test]
fn next_then_prev_returns_to_the_same_track_with_wrap_around() {
    let catalog = fallback_catalog();
    let mut t = synthetic_transport();

    for start in [0usize, 4, 9] {
        let song = catalog.get(start).unwrap().clone();
        t.play_song(&song);
        t.next_song(&catalog);
        let expected_next = catalog.get((start + 1) % catalog.len()).unwrap();
        assert_eq!(t.current_song(), Some(expected_next));
        t.prev_song(&catalog);
        assert_eq!(t.current_song(), Some(&song));
    }

    // Prev from the first entry wraps to the last.
    t.play_song(catalog.get(0).unwrap());
    t.prev_song(&catalog);
    assert_eq!(t.current_song().unwrap().id, "10");
}

#[test]
fn next_and_prev_are_no_ops_without_current_song_or_catalog() {
    let catalog = fallback_catalog();
    let mut t = synthetic_transport();
    t.next_song(&catalog);
    t.prev_song(&catalog);
    assert!(t.current_song().is_none());

    t.play_song(catalog.get(2).unwrap());
    t.next_song(&Catalog::default());
    assert_eq!(t.current_song().unwrap().id, "3");
}

#[test]
fn shuffle_never_repeats_the_current_track() {
    let catalog = fallback_catalog();
    let mut t = synthetic_transport();
    t.toggle_shuffle();
    assert!(t.state().is_shuffle);

    t.play_song(catalog.get(0).unwrap());
    for _ in 0..50 {
        let before = t.current_song().unwrap().id.clone();
        t.next_song(&catalog);
        assert_ne!(t.current_song().unwrap().id, before);
        let before = t.current_song().unwrap().id.clone();
        t.prev_song(&catalog);
        assert_ne!(t.current_song().unwrap().id, before);
    }
}

#[test]
fn shuffle_with_single_track_replays_it() {
    let catalog = Catalog::new(vec![synthetic_song("only", 10)]);
    let mut t = synthetic_transport();
    t.toggle_shuffle();
    t.play_song(catalog.get(0).unwrap());
    t.next_song(&catalog);
    assert_eq!(t.current_song().unwrap().id, "only");
}

#[test]
fn current_song_missing_from_catalog_steps_to_the_ends() {
    let catalog = fallback_catalog();
    let mut t = synthetic_transport();
    t.play_song(&synthetic_song("gone", 10));
    t.next_song(&catalog);
    assert_eq!(t.current_song().unwrap().id, "1");
    t.play_song(&synthetic_song("gone", 10));
    t.prev_song(&catalog);
    assert_eq!(t.current_song().unwrap().id, "10");
}

#[test]
fn play_then_pause_keeps_progress() {
    let catalog = fallback_catalog();
    let mut t = synthetic_transport();
    t.play_song(catalog.get(0).unwrap());
    let now = run_ticks(&mut t, &catalog, Instant::now(), 3);
    assert_eq!(t.progress(), Duration::from_secs(3));

    t.pause_song();
    assert!(!t.state().is_playing);
    assert_eq!(t.progress(), Duration::from_secs(3));
    assert!(!t.is_ticking());

    // Paused: time passing does nothing.
    t.tick(now + Duration::from_secs(10), &catalog);
    assert_eq!(t.progress(), Duration::from_secs(3));

    t.resume_song();
    assert!(t.state().is_playing);
    assert!(t.is_ticking());
    run_ticks(&mut t, &catalog, now + Duration::from_secs(20), 2);
    assert_eq!(t.progress(), Duration::from_secs(5));
}

#[test]
fn pause_immediately_after_play_leaves_progress_at_zero() {
    let (mut t, _) = transport_with(false, None);
    t.play_song(&real_song("r", 100));
    t.pause_song();
    assert!(!t.state().is_playing);
    assert_eq!(t.progress(), Duration::ZERO);
}

#[test]
fn synthetic_end_with_repeat_off_and_single_track_stops() {
    let catalog = Catalog::new(vec![synthetic_song("one", 3)]);
    let mut t = synthetic_transport();
    t.play_song(catalog.get(0).unwrap());
    run_ticks(&mut t, &catalog, Instant::now(), 3);

    assert!(!t.state().is_playing);
    assert_eq!(t.progress(), Duration::ZERO);
    assert!(!t.is_ticking());
    assert_eq!(t.current_song().unwrap().id, "one");
}

#[test]
fn synthetic_end_with_repeat_track_replays_from_zero() {
    let catalog = Catalog::new(vec![synthetic_song("one", 3)]);
    let mut t = synthetic_transport();
    t.toggle_repeat_mode();
    assert_eq!(t.state().repeat_mode, RepeatMode::Track);
    t.play_song(catalog.get(0).unwrap());
    let now = run_ticks(&mut t, &catalog, Instant::now(), 3);

    assert!(t.state().is_playing);
    assert_eq!(t.progress(), Duration::ZERO);
    assert_eq!(t.current_song().unwrap().id, "one");

    // And it keeps counting on the replay.
    t.tick(now + Duration::from_secs(1), &catalog);
    assert_eq!(t.progress(), Duration::from_secs(1));
}

#[test]
fn synthetic_end_advances_in_multi_track_catalog() {
    let catalog = Catalog::new(vec![synthetic_song("a", 2), synthetic_song("b", 5)]);
    let mut t = synthetic_transport();
    t.play_song(catalog.get(0).unwrap());
    run_ticks(&mut t, &catalog, Instant::now(), 2);

    assert!(t.state().is_playing);
    assert_eq!(t.current_song().unwrap().id, "b");
    assert_eq!(t.progress(), Duration::ZERO);
    assert_eq!(t.duration(), Duration::from_secs(5));
}

#[test]
fn repeat_queue_with_single_track_loops_it() {
    let catalog = Catalog::new(vec![synthetic_song("one", 2)]);
    let mut t = synthetic_transport();
    t.set_repeat_mode(RepeatMode::Queue);
    t.play_song(catalog.get(0).unwrap());
    run_ticks(&mut t, &catalog, Instant::now(), 2);

    assert!(t.state().is_playing);
    assert_eq!(t.current_song().unwrap().id, "one");
    assert_eq!(t.progress(), Duration::ZERO);
}

#[test]
fn late_polls_count_every_elapsed_interval() {
    let catalog = fallback_catalog();
    let mut t = synthetic_transport();
    t.play_song(catalog.get(0).unwrap());
    let start = Instant::now();
    t.tick(start, &catalog);
    t.tick(start + Duration::from_millis(4500), &catalog);
    assert_eq!(t.progress(), Duration::from_secs(4));
}

#[test]
fn repeat_mode_cycles_off_track_queue() {
    let mut t = synthetic_transport();
    t.toggle_repeat_mode();
    t.toggle_repeat_mode();
    assert_eq!(t.state().repeat_mode, RepeatMode::Queue);
    t.toggle_repeat_mode();
    assert_eq!(t.state().repeat_mode, RepeatMode::Off);
}

#[test]
fn toggle_shuffle_does_not_touch_playback() {
    let catalog = fallback_catalog();
    let mut t = synthetic_transport();
    t.play_song(catalog.get(1).unwrap());
    t.toggle_shuffle();
    assert!(t.state().is_playing);
    assert_eq!(t.current_song().unwrap().id, "2");
}

#[test]
fn real_song_uses_reported_duration_and_seeks_in_millis() {
    let (mut t, probe) = transport_with(false, Some(123_000));
    t.play_song(&real_song("r", 100));
    assert_eq!(t.duration(), Duration::from_secs(123));
    assert!(!t.state().is_synthetic);
    assert!(!t.is_ticking());

    t.seek_to(Duration::from_secs(42));
    assert_eq!(t.progress(), Duration::from_secs(42));
    assert!(probe.borrow().log.contains(&"seek /music/r.mp3 42000".to_string()));
}

#[test]
fn real_song_without_reported_duration_uses_song_duration() {
    let (mut t, _) = transport_with(false, None);
    t.play_song(&real_song("r", 100));
    assert_eq!(t.duration(), Duration::from_secs(100));
}

#[test]
fn seek_on_synthetic_song_only_sets_progress() {
    let (mut t, probe) = transport_with(false, None);
    t.play_song(&synthetic_song("s", 100));
    t.seek_to(Duration::from_secs(30));
    assert_eq!(t.progress(), Duration::from_secs(30));
    assert!(probe.borrow().log.is_empty());
}

#[test]
fn failed_acquisition_degrades_to_synthetic_playback() {
    let (mut t, _) = transport_with(true, None);
    let catalog = Catalog::new(vec![real_song("r", 2)]);
    t.play_song(catalog.get(0).unwrap());

    let s = t.state();
    assert!(s.is_playing);
    assert!(s.is_synthetic);
    assert_eq!(s.duration, Duration::from_secs(2));

    run_ticks(&mut t, &catalog, Instant::now(), 1);
    assert_eq!(t.progress(), Duration::from_secs(1));
}

#[test]
fn play_releases_the_previous_handle_before_acquiring() {
    let (mut t, probe) = transport_with(false, None);
    let catalog = Catalog::new(vec![real_song("a", 10), real_song("b", 10), real_song("c", 10)]);
    t.play_song(catalog.get(0).unwrap());
    t.next_song(&catalog);
    t.next_song(&catalog);
    t.play_song(&synthetic_song("s", 10));

    let p = probe.borrow();
    assert_eq!(p.max_live_handles, 1);
    assert_eq!(p.live_handles, 0);
    assert_eq!(
        p.log,
        vec![
            "create /music/a.mp3",
            "release /music/a.mp3",
            "create /music/b.mp3",
            "release /music/b.mp3",
            "create /music/c.mp3",
            "release /music/c.mp3",
        ]
    );
}

#[test]
fn pause_and_resume_drive_the_real_handle() {
    let (mut t, probe) = transport_with(false, None);
    t.play_song(&real_song("r", 10));
    t.toggle_play();
    assert!(!t.state().is_playing);
    t.toggle_play();
    assert!(t.state().is_playing);

    let p = probe.borrow();
    assert_eq!(p.log[1], "pause /music/r.mp3");
    assert_eq!(p.log[2], "resume /music/r.mp3");
}

#[test]
fn status_updates_move_progress_and_duration() {
    let (mut t, probe) = transport_with(false, None);
    let catalog = Catalog::new(vec![real_song("r", 10)]);
    t.play_song(catalog.get(0).unwrap());

    probe.borrow_mut().statuses.push_back(PlaybackStatus {
        position_ms: 2_500,
        duration_ms: Some(9_000),
        is_playing: true,
        is_loaded: true,
        did_finish: false,
    });
    t.pump(Instant::now(), &catalog);
    assert_eq!(t.progress(), Duration::from_millis(2_500));
    assert_eq!(t.duration(), Duration::from_secs(9));

    // Unloaded statuses are ignored.
    t.on_status(
        PlaybackStatus {
            position_ms: 9_999,
            ..PlaybackStatus::default()
        },
        &catalog,
    );
    assert_eq!(t.progress(), Duration::from_millis(2_500));
}

#[test]
fn real_stream_finish_follows_the_completion_rules() {
    let finished = PlaybackStatus {
        is_loaded: true,
        did_finish: true,
        ..PlaybackStatus::default()
    };

    // Single track, repeat off: stop and drop the finished stream.
    let (mut t, probe) = transport_with(false, None);
    let single = Catalog::new(vec![real_song("r", 10)]);
    t.play_song(single.get(0).unwrap());
    t.on_status(finished, &single);
    assert!(!t.state().is_playing);
    assert_eq!(t.progress(), Duration::ZERO);
    assert_eq!(probe.borrow().live_handles, 0);

    // Resuming a finished stream starts it over.
    t.resume_song();
    assert!(t.state().is_playing);
    assert_eq!(probe.borrow().live_handles, 1);

    // Repeat track: reopen the same stream.
    t.set_repeat_mode(RepeatMode::Track);
    t.on_status(finished, &single);
    assert!(t.state().is_playing);
    assert_eq!(t.current_song().unwrap().id, "r");
    assert_eq!(probe.borrow().max_live_handles, 1);

    // Two tracks: advance.
    let two = Catalog::new(vec![real_song("a", 10), real_song("b", 10)]);
    t.set_repeat_mode(RepeatMode::Off);
    t.play_song(two.get(0).unwrap());
    t.on_status(finished, &two);
    assert_eq!(t.current_song().unwrap().id, "b");
}

#[test]
fn seek_after_finished_stream_is_kept_on_resume() {
    let (mut t, probe) = transport_with(false, Some(10_000));
    let single = Catalog::new(vec![real_song("r", 10)]);
    t.play_song(single.get(0).unwrap());
    t.on_status(
        PlaybackStatus {
            is_loaded: true,
            did_finish: true,
            ..PlaybackStatus::default()
        },
        &single,
    );
    assert_eq!(probe.borrow().live_handles, 0);

    t.seek_to(Duration::from_secs(4));
    t.resume_song();
    assert!(t.state().is_playing);
    assert_eq!(t.progress(), Duration::from_secs(4));
    assert_eq!(probe.borrow().log.last().unwrap(), "seek /music/r.mp3 4000");

    // A seek past the end starts over instead.
    t.stop();
    t.seek_to(Duration::from_secs(30));
    t.resume_song();
    assert_eq!(t.progress(), Duration::ZERO);
    assert_eq!(probe.borrow().log.last().unwrap(), "create /music/r.mp3");
}

#[test]
fn stop_and_drop_release_the_handle() {
    let (mut t, probe) = transport_with(false, None);
    t.play_song(&real_song("r", 10));
    t.stop();
    assert!(!t.state().is_playing);
    assert_eq!(probe.borrow().live_handles, 0);

    t.play_song(&real_song("r", 10));
    drop(t);
    assert_eq!(probe.borrow().live_handles, 0);
}

#[test]
fn ticker_arms_on_first_poll_and_stops_cleanly() {
    let mut ticker = Ticker::new(Duration::from_secs(1));
    let t0 = Instant::now();
    assert_eq!(ticker.poll(t0), 0);
    assert!(!ticker.is_active());

    ticker.start();
    assert_eq!(ticker.poll(t0), 0);
    assert_eq!(ticker.poll(t0 + Duration::from_millis(999)), 0);
    assert_eq!(ticker.poll(t0 + Duration::from_secs(1)), 1);
    assert_eq!(ticker.poll(t0 + Duration::from_secs(4)), 3);

    ticker.stop();
    assert_eq!(ticker.poll(t0 + Duration::from_secs(10)), 0);
}

#[test]
fn null_output_always_fails() {
    let mut out = NullOutput::new("no device");
    assert!(matches!(
        out.create("/x.mp3", true),
        Err(OutputError::Unavailable(_))
    ));
}
