//! Benchmarks for the serialized mutation path: queued present/dismiss
//! cycles, settled as a render surface would.
//!
//! Run with: cargo bench -p rudder-core --bench sequencer_bench

use criterion::{Criterion, criterion_group, criterion_main};
use rudder_core::{ModalStackCoordinator, PresentationItem, TransitionStyle};
use std::hint::black_box;

fn present_dismiss_cycle(depth: usize, animated: bool) {
    let mut stack = ModalStackCoordinator::new();
    for i in 0..depth {
        stack.present(
            PresentationItem::new(format!("layer-{i}"), TransitionStyle::Sheet, || Some(()))
                .animated(animated),
        );
        if animated {
            stack.settle_transition();
        }
    }
    for _ in 0..depth {
        stack.remove_last_presented(animated);
        if animated {
            stack.settle_transition();
        }
    }
    black_box(stack.slot_count());
}

fn bench_modal_stack(c: &mut Criterion) {
    c.bench_function("present_dismiss_8_unanimated", |b| {
        b.iter(|| present_dismiss_cycle(black_box(8), false));
    });
    c.bench_function("present_dismiss_8_animated_settled", |b| {
        b.iter(|| present_dismiss_cycle(black_box(8), true));
    });
    c.bench_function("clean_depth_32", |b| {
        b.iter(|| {
            let mut stack = ModalStackCoordinator::new();
            for i in 0..32 {
                stack.present(
                    PresentationItem::new(format!("layer-{i}"), TransitionStyle::Sheet, || {
                        Some(())
                    })
                    .animated(false),
                );
            }
            stack.clean();
            black_box(stack.slot_count());
        });
    });
}

criterion_group!(benches, bench_modal_stack);
criterion_main!(benches);
