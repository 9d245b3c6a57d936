// Asynchronous load coordination
//
// Byte sources are oneshot channels so each test decides when (and whether)
// the bytes of a load arrive.

mod common;

use common::{parallel, TrackBuilder};
use futures::channel::oneshot;
use futures::executor::block_on;
use piano_roll_wasm::{LoadOutcome, ParseError, Player, TickStatus};
use std::future::Future;

#[derive(Debug, PartialEq)]
enum SourceError {
    Parse(ParseError),
    Dropped,
}

impl From<ParseError> for SourceError {
    fn from(err: ParseError) -> Self {
        SourceError::Parse(err)
    }
}

fn pending_load(player: &Player) -> (oneshot::Sender<Vec<u8>>, impl Future<Output = Result<LoadOutcome, SourceError>>) {
    let (tx, rx) = oneshot::channel::<Vec<u8>>();
    let load = player.load(async move { rx.await.map_err(|_| SourceError::Dropped) });
    (tx, load)
}

fn bars(count: u32) -> Vec<u8> {
    parallel(vec![TrackBuilder::new().beats(60, 0, count * 4)])
}

#[test]
fn test_load_commits_and_resets_transport() {
    let player = Player::default();
    player.load_bytes(&bars(2)).unwrap();
    player.play();
    player.tick(1.0);

    let (tx, load) = pending_load(&player);
    tx.send(bars(5)).unwrap();
    assert_eq!(block_on(load), Ok(LoadOutcome::Committed));

    assert_eq!(player.num_bars(), 5);
    assert_eq!(player.current_time(), 0.0);
    assert!(!player.is_playing());
    assert!(player.transport().sounding().is_empty());
}

#[test]
fn test_ticks_deferred_and_old_score_rendered_while_pending() {
    let player = Player::default();
    player.load_bytes(&bars(2)).unwrap();
    player.play();
    player.tick(0.5);
    let before = player.render_display_list(0.0, 0.0, 800.0, 600.0);

    let (tx, load) = pending_load(&player);
    assert_eq!(player.tick(0.5), TickStatus::Deferred);
    assert_eq!(player.current_time(), 0.5);
    assert_eq!(player.num_bars(), 2);
    assert_eq!(player.render_display_list(0.0, 0.0, 800.0, 600.0), before);

    tx.send(bars(3)).unwrap();
    block_on(load).unwrap();
    assert_eq!(player.num_bars(), 3);
}

#[test]
fn test_newest_load_wins_when_it_finishes_last() {
    let player = Player::default();
    let (first_tx, first) = pending_load(&player);
    let (second_tx, second) = pending_load(&player);

    first_tx.send(bars(7)).unwrap();
    assert_eq!(block_on(first), Ok(LoadOutcome::Superseded));
    assert!(!player.ready());
    assert_eq!(player.tick(0.1), TickStatus::Deferred);

    second_tx.send(bars(3)).unwrap();
    assert_eq!(block_on(second), Ok(LoadOutcome::Committed));
    assert_eq!(player.num_bars(), 3);
}

#[test]
fn test_newest_load_wins_when_it_finishes_first() {
    let player = Player::default();
    let (first_tx, first) = pending_load(&player);
    let (second_tx, second) = pending_load(&player);

    second_tx.send(bars(3)).unwrap();
    assert_eq!(block_on(second), Ok(LoadOutcome::Committed));

    // Even a failing stale result is discarded silently
    first_tx.send(b"garbage".to_vec()).unwrap();
    assert_eq!(block_on(first), Ok(LoadOutcome::Superseded));
    assert_eq!(player.num_bars(), 3);
}

#[test]
fn test_parse_failure_keeps_previous_score() {
    let player = Player::default();
    player.load_bytes(&bars(4)).unwrap();

    let (tx, load) = pending_load(&player);
    tx.send(b"MThx\x00\x00\x00\x06\x00\x01\x00\x01\x01\xE0".to_vec()).unwrap();
    let result = block_on(load);
    assert!(matches!(result, Err(SourceError::Parse(ParseError::BadHeader(_)))));

    assert_eq!(player.num_bars(), 4);
    assert!(!player.transport().load_pending());
}

#[test]
fn test_dropped_source_releases_pending_flag() {
    let player = Player::default();
    player.load_bytes(&bars(4)).unwrap();
    player.play();

    let (tx, load) = pending_load(&player);
    drop(tx);
    assert_eq!(block_on(load), Err(SourceError::Dropped));

    assert_eq!(player.tick(0.25), TickStatus::Advanced);
    assert_eq!(player.num_bars(), 4);
}

#[test]
fn test_loop_bars_survive_reload() {
    let player = Player::default();
    player.load_bytes(&bars(4)).unwrap();
    player.set_loop_bars(1, 3);

    player.load_bytes(&bars(2)).unwrap();
    let region = player.transport().loop_region().unwrap();
    assert_eq!((region.start_bar, region.end_bar), (1, 2));
}
