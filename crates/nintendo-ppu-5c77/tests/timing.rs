//! Beam timing, interrupts and the per-line DMA hook.

use emu_core::Ticks;
use nintendo_ppu_5c77::{InterruptConfig, NoDma, Ppu, PpuConfig, VideoStandard};

fn ppu(standard: VideoStandard) -> Ppu {
    Ppu::new(PpuConfig::from(standard)).expect("valid config")
}

#[test]
fn one_tick_four_times_matches_four_ticks_once() {
    let mut a = ppu(VideoStandard::Ntsc);
    let mut b = ppu(VideoStandard::Ntsc);
    for _ in 0..4 {
        a.advance(Ticks::new(1), &mut NoDma);
    }
    b.advance(Ticks::new(4), &mut NoDma);
    assert_eq!(a.h_counter(), 1);
    assert_eq!(a.h_counter(), b.h_counter());
    assert_eq!(a.v_counter(), b.v_counter());
}

#[test]
fn frame_ready_once_per_period_at_any_granularity() {
    for step in [1, 3, 4, 7, 341, 1364, 10_000] {
        let mut ppu = ppu(VideoStandard::Ntsc);
        let frame = 1364 * 262;
        let mut remaining = frame * 3;
        let mut frames = 0;
        while remaining > 0 {
            let n = remaining.min(step);
            ppu.advance(Ticks::new(n), &mut NoDma);
            if ppu.take_frame_ready() {
                frames += 1;
                assert!(ppu.in_vblank(), "step {step}");
            }
            remaining -= n;
        }
        assert_eq!(frames, 3, "step {step}");
        assert_eq!(ppu.frame_count(), 3);
    }
}

#[test]
fn pal_frame_is_312_lines() {
    let mut ppu = ppu(VideoStandard::Pal);
    ppu.advance(Ticks::new(1364 * 311), &mut NoDma);
    assert!(ppu.take_frame_ready());
    assert_eq!(ppu.v_counter(), 311);
    ppu.advance(Ticks::new(1364), &mut NoDma);
    assert_eq!(ppu.v_counter(), 0);
    assert!(!ppu.take_frame_ready());
}

#[test]
fn dma_hook_runs_on_every_line() {
    let mut ntsc = ppu(VideoStandard::Ntsc);
    let mut lines = Vec::new();
    ntsc.advance(Ticks::new(1364 * 262), &mut |line: u16| lines.push(line));
    assert_eq!(lines, (0..262).collect::<Vec<u16>>());

    let mut pal = ppu(VideoStandard::Pal);
    let mut count = 0;
    pal.advance(Ticks::new(1364 * 312), &mut |_line: u16| count += 1);
    assert_eq!(count, 312);
}

#[test]
fn nmi_only_when_armed() {
    let mut ppu = ppu(VideoStandard::Ntsc);
    ppu.advance(Ticks::new(1364 * 262), &mut NoDma);
    assert!(ppu.take_frame_ready());
    assert!(!ppu.take_nmi());

    ppu.set_interrupts(InterruptConfig {
        nmi_enabled: true,
        ..InterruptConfig::default()
    });
    ppu.advance(Ticks::new(1364 * 262), &mut NoDma);
    assert!(ppu.take_nmi());
    assert!(!ppu.take_nmi());
}

#[test]
fn v_irq_fires_at_dot_zero_of_target_line() {
    let mut ppu = ppu(VideoStandard::Ntsc);
    ppu.set_interrupts(InterruptConfig {
        v_irq_enabled: true,
        vtime: 100,
        ..InterruptConfig::default()
    });
    ppu.advance(Ticks::new(1364 * 100 - 4), &mut NoDma);
    assert!(!ppu.take_irq());
    ppu.advance(Ticks::new(4), &mut NoDma);
    assert!(ppu.take_irq());
    assert_eq!((ppu.h_counter(), ppu.v_counter()), (0, 100));
    ppu.advance(Ticks::new(1364), &mut NoDma);
    assert!(!ppu.take_irq());
}

#[test]
fn hv_irq_fires_once_per_frame() {
    let mut ppu = ppu(VideoStandard::Ntsc);
    ppu.set_interrupts(InterruptConfig {
        h_irq_enabled: true,
        v_irq_enabled: true,
        htime: 200,
        vtime: 50,
        ..InterruptConfig::default()
    });
    let mut count = 0;
    for _ in 0..262 * 2 {
        ppu.advance(Ticks::new(1364), &mut NoDma);
        if ppu.take_irq() {
            count += 1;
            assert_eq!(ppu.v_counter(), 51);
        }
    }
    assert_eq!(count, 2);
}

#[test]
fn blank_flags_follow_the_beam() {
    let mut ppu = ppu(VideoStandard::Ntsc);
    assert!(ppu.in_vblank());
    ppu.advance(Ticks::new(1364 + 30 * 4), &mut NoDma);
    assert!(!ppu.in_vblank());
    assert!(!ppu.in_hblank());
    ppu.advance(Ticks::new(260 * 4), &mut NoDma);
    assert!(ppu.in_hblank());
}
