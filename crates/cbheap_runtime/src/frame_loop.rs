//! Simulated renderer frame loop
//!
//! The host timeline records per-object constants in parallel and
//! submits; the device timeline retires frames `frames_in_flight` behind.

use crate::settings::RuntimeSettings;
use anyhow::{bail, Result};
use cbheap_core::{ConstantBufferHeap, FrameListener, HeapStats, HostDevice, VolatileConstBuffer};
use cbheap_metrics::FrameHistory;
use glam::{Mat4, Quat, Vec3, Vec4};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;

/// Bones in the oversized palette upload (64 bytes each).
const PALETTE_BONES: usize = 1100;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct ObjectConstants {
    world: [[f32; 4]; 4],
    tint: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct SceneConstants {
    view_proj: [[f32; 4]; 4],
    light_dir: [f32; 4],
}

fn object_constants(frame: u64, index: usize) -> ObjectConstants {
    let t = frame as f32 / 60.0;
    let angle = t + index as f32 * 0.01;
    let world = Mat4::from_scale_rotation_translation(
        Vec3::splat(0.5),
        Quat::from_rotation_z(angle),
        Vec3::new((index % 64) as f32, (index / 64) as f32, 0.0),
    );
    ObjectConstants {
        world: world.to_cols_array_2d(),
        tint: Vec4::new(angle.sin().abs(), 0.5, 1.0, 1.0).to_array(),
    }
}

fn bone_palette(frame: u64) -> Vec<[[f32; 4]; 4]> {
    (0..PALETTE_BONES)
        .map(|bone| {
            Mat4::from_rotation_y(frame as f32 * 0.02 + bone as f32 * 0.001).to_cols_array_2d()
        })
        .collect()
}

/// What a run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub frames: u64,
    pub uploads: u64,
    pub final_stats: HeapStats,
    pub average_record_us: u64,
    pub peak_record_us: u64,
}

pub fn run(device: Arc<HostDevice>, settings: &RuntimeSettings) -> Result<RunSummary> {
    anyhow::ensure!(settings.frames_in_flight >= 1, "frames_in_flight must be at least 1");
    let heap = ConstantBufferHeap::new(device.clone(), settings.heap.clone())?;

    let scene = SceneConstants {
        view_proj: Mat4::perspective_rh(1.0, 16.0 / 9.0, 0.1, 100.0).to_cols_array_2d(),
        light_dir: Vec4::new(0.3, -1.0, 0.2, 0.0).normalize().to_array(),
    };
    let scene_buffer = heap.allocate_persistent_pod(&scene)?;
    tracing::info!(gpu = ?scene_buffer.gpu_address(), "scene constants uploaded");

    let mut record_times = FrameHistory::new(settings.report_every.max(1) as usize);
    let mut next_device_frame = 0u64;
    let mut uploads = 0u64;

    for frame in 0..settings.frames {
        heap.on_frame_begin_host(frame);
        let started = Instant::now();

        let buffers: Vec<VolatileConstBuffer> = (0..settings.objects_per_frame)
            .into_par_iter()
            .map(|index| heap.allocate_volatile_pod(&object_constants(frame, index)))
            .collect::<Result<_, _>>()?;
        uploads += buffers.len() as u64;

        if let Some(last) = buffers.last() {
            let expected = object_constants(frame, buffers.len() - 1);
            verify_upload(&device, last, bytemuck::bytes_of(&expected))?;
        }

        if settings.large_upload_every > 0 && frame % settings.large_upload_every == 0 {
            let palette = bone_palette(frame);
            let bytes: &[u8] = bytemuck::cast_slice(palette.as_slice());
            let buffer = heap.allocate_volatile(bytes)?;
            verify_upload(&device, &buffer, bytes)?;
            uploads += 1;
        }

        record_times.push(started.elapsed().as_micros() as u64);
        heap.on_frame_complete_host(frame);

        // The GPU keeps at most `frames_in_flight` submitted frames queued.
        while frame + 1 - next_device_frame >= settings.frames_in_flight {
            retire(&heap, next_device_frame);
            next_device_frame += 1;
        }

        if settings.report_every > 0 && (frame + 1) % settings.report_every == 0 {
            let stats = heap.stats();
            tracing::info!(
                frame,
                standard_pages = stats.standard_pages,
                large_pages = stats.large_pages,
                reserved_kib = stats.reserved_bytes() / 1024,
                avg_record_us = record_times.average(),
                "heap report"
            );
        }
    }

    while next_device_frame < settings.frames {
        retire(&heap, next_device_frame);
        next_device_frame += 1;
    }

    let final_stats = heap.stats();
    for (name, value) in &final_stats.counters {
        tracing::debug!(counter = *name, value, "heap counter");
    }
    drop(scene_buffer);

    Ok(RunSummary {
        frames: settings.frames,
        uploads,
        final_stats,
        average_record_us: record_times.average(),
        peak_record_us: record_times.peak(),
    })
}

fn retire(listener: &dyn FrameListener, frame: u64) {
    listener.on_frame_begin_device(frame);
    listener.on_frame_complete_device(frame);
}

/// Check what the GPU would read against what was uploaded.
fn verify_upload(device: &HostDevice, buffer: &VolatileConstBuffer, expected: &[u8]) -> Result<()> {
    match device.read_gpu(buffer.gpu_address(), buffer.size()) {
        Some(bytes) if bytes == expected => Ok(()),
        Some(_) => bail!("upload at {:?} does not match its source", buffer.gpu_address()),
        None => bail!("upload at {:?} is outside any live resource", buffer.gpu_address()),
    }
}
