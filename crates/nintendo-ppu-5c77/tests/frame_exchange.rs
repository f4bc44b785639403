//! Frame hand-off between an emulation thread and a display thread.

use std::thread;
use std::time::{Duration, Instant};

use emu_core::{Bus, Ticks};
use nintendo_ppu_5c77::{NoDma, Ppu, PpuConfig, frame_channel, rgb15_to_argb32};

const FRAME_TICKS: u64 = 1364 * 262;

fn lit_ppu() -> Ppu {
    let mut ppu = Ppu::new(PpuConfig::ntsc()).expect("valid config");
    ppu.write(0x2100, 0x0F);
    ppu
}

fn set_backdrop(ppu: &mut Ppu, color: u16) {
    ppu.write(0x2121, 0x00);
    ppu.write(0x2122, color as u8);
    ppu.write(0x2122, (color >> 8) as u8);
}

#[test]
fn frames_arrive_in_order_on_another_thread() {
    const FRAMES: u64 = 20;
    let (tx, mut rx) = frame_channel(FRAMES as usize);

    let consumer = thread::spawn(move || {
        let deadline = Instant::now() + Duration::from_secs(30);
        let mut seen = Vec::new();
        while seen.len() < FRAMES as usize && Instant::now() < deadline {
            match rx.try_recv() {
                Some(frame) => {
                    seen.push((frame.number, frame.pixels[0]));
                    rx.recycle(frame);
                }
                None => thread::yield_now(),
            }
        }
        seen
    });

    let mut ppu = lit_ppu();
    ppu.attach_frame_sender(tx);
    for n in 0..FRAMES {
        set_backdrop(&mut ppu, n as u16);
        ppu.advance(Ticks::new(FRAME_TICKS), &mut NoDma);
    }
    let dropped = ppu.frame_sender().map_or(0, |tx| tx.dropped());

    let seen = consumer.join().expect("consumer thread");
    assert_eq!(dropped, 0);
    assert_eq!(seen.len(), FRAMES as usize);
    for (i, &(number, pixel)) in seen.iter().enumerate() {
        assert_eq!(number, i as u64 + 1);
        assert_eq!(pixel, rgb15_to_argb32(i as u16));
    }
}

#[test]
fn full_ring_drops_frames_and_counts_them() {
    let (tx, mut rx) = frame_channel(2);
    let mut ppu = lit_ppu();
    ppu.attach_frame_sender(tx);

    for _ in 0..5 {
        ppu.advance(Ticks::new(FRAME_TICKS), &mut NoDma);
    }
    assert_eq!(ppu.frame_count(), 5);
    assert_eq!(ppu.frame_sender().map(|tx| tx.dropped()), Some(3));

    // Oldest frames were kept; later ones were skipped.
    assert_eq!(rx.try_recv().map(|f| f.number), Some(1));
    assert_eq!(rx.try_recv().map(|f| f.number), Some(2));
    assert!(rx.try_recv().is_none());
}

#[test]
fn latest_skips_to_newest_frame() {
    let (tx, mut rx) = frame_channel(4);
    let mut ppu = lit_ppu();
    ppu.attach_frame_sender(tx);
    for _ in 0..3 {
        ppu.advance(Ticks::new(FRAME_TICKS), &mut NoDma);
    }
    let frame = rx.latest().expect("a frame");
    assert_eq!(frame.number, 3);
    assert_eq!(frame.pixels.len(), 256 * 224);
    assert!(rx.latest().is_none());
}

#[test]
fn published_frame_matches_display_buffer() {
    let (tx, mut rx) = frame_channel(1);
    let mut ppu = lit_ppu();
    set_backdrop(&mut ppu, 0x7C1F);
    ppu.attach_frame_sender(tx);
    ppu.advance(Ticks::new(FRAME_TICKS), &mut NoDma);

    let frame = rx.try_recv().expect("a frame");
    assert_eq!(&frame.pixels[..], ppu.framebuffer());
}
