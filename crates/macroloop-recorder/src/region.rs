//! Checkpoint region from two clicked corners

use crate::hub::InputSource;
use crate::storage::MacroStore;
use macroloop_core::{BoundingBox, Error, InputEvent, Point, Result};
use std::path::PathBuf;
use tracing::debug;

/// Which corner a click stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    BottomRight,
}

pub struct RegionSelector;

impl RegionSelector {
    /// Block until two pointer presses arrive: top-left, then bottom-right.
    /// No timeout. `on_corner` runs after each accepted click so the caller
    /// can prompt for the next one.
    pub fn capture(
        source: &dyn InputSource,
        mut on_corner: impl FnMut(Corner, Point),
    ) -> Result<BoundingBox> {
        let subscription = source.subscribe()?;
        let mut corners = Vec::with_capacity(2);

        while corners.len() < 2 {
            match subscription.recv() {
                Some(InputEvent::Click {
                    position,
                    pressed: true,
                    ..
                }) => {
                    let corner = if corners.is_empty() {
                        Corner::TopLeft
                    } else {
                        Corner::BottomRight
                    };
                    debug!(?corner, %position, "corner captured");
                    corners.push(position);
                    on_corner(corner, position);
                }
                Some(_) => {}
                None => {
                    return Err(Error::listener_failed(
                        "input feed closed before both corners were clicked",
                    ))
                }
            }
        }
        drop(subscription);

        let region = BoundingBox::new(corners[0], corners[1]);
        region.validate()?;
        Ok(region)
    }

    pub fn save(store: &MacroStore, region: &BoundingBox) -> Result<PathBuf> {
        store.save_box(region)
    }

    pub fn load(store: &MacroStore) -> Result<BoundingBox> {
        store.load_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::InputHub;
    use macroloop_core::{Button, ErrorCode, Key};
    use std::thread;

    fn click(x: i32, y: i32, pressed: bool) -> InputEvent {
        InputEvent::Click {
            button: Button::Left,
            position: Point::new(x, y),
            pressed,
        }
    }

    /// Publish once the selector has subscribed.
    fn feed(hub: &InputHub, events: Vec<InputEvent>) -> thread::JoinHandle<()> {
        let hub = hub.clone();
        thread::spawn(move || {
            while hub.subscriber_count() == 0 {
                thread::yield_now();
            }
            for event in events {
                hub.publish(event);
            }
        })
    }

    #[test]
    fn two_presses_make_a_box() {
        let hub = InputHub::new();
        let feeder = feed(
            &hub,
            vec![
                InputEvent::KeyPress(Key::Char('a')),
                click(10, 20, true),
                click(10, 20, false),
                click(110, 220, true),
            ],
        );

        let mut seen = Vec::new();
        let region = RegionSelector::capture(&hub, |corner, p| seen.push((corner, p))).unwrap();
        feeder.join().unwrap();

        assert_eq!(region, BoundingBox::new(Point::new(10, 20), Point::new(110, 220)));
        assert_eq!(seen[0].0, Corner::TopLeft);
        assert_eq!(seen[1].0, Corner::BottomRight);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn reversed_corners_are_rejected() {
        let hub = InputHub::new();
        let feeder = feed(&hub, vec![click(100, 100, true), click(10, 10, true)]);
        let err = RegionSelector::capture(&hub, |_, _| {}).unwrap_err();
        feeder.join().unwrap();
        assert_eq!(err.code, ErrorCode::InvalidRegion);
    }

    #[test]
    fn closed_feed_is_an_error() {
        let hub = InputHub::new();
        hub.close();
        let err = RegionSelector::capture(&hub, |_, _| {}).unwrap_err();
        assert_eq!(err.code, ErrorCode::ListenerFailed);
    }
}
