mod controls;
mod draw;

use controls::{Action, Tuning};
use draw::FrameCanvas;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use stance_base::{init_stdout_logger, log_fatal};
use stance_image::{list_frames, load_rgb};
use stance_infer::{Device, ModelSource, OnnxBackend, PoseConfig, PoseTracker};
use std::env;
use std::path::PathBuf;

const KEYPOINT_RADIUS: i32 = 3;

fn device_from_env() -> Device {
    match env::var("STANCE_DEVICE") {
        Ok(value) => Device::parse(&value).unwrap_or_else(|| {
            log_fatal!("unknown STANCE_DEVICE '{}', expected cpu, cuda:N or tensorrt:N", value)
        }),
        Err(_) => Device::Cpu,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_stdout_logger();

    let model_path: PathBuf = env::var("STANCE_MODEL_PATH")
        .unwrap_or_else(|_| "models/posenet_mobilenet.onnx".to_string())
        .into();
    let frames_dir: PathBuf = env::var("STANCE_FRAMES")
        .unwrap_or_else(|_| "frames".to_string())
        .into();
    let config = match env::var("STANCE_CONFIG") {
        Ok(path) => PoseConfig::load(path)?,
        Err(_) => PoseConfig::default(),
    };
    let device = device_from_env();

    let frames = list_frames(&frames_dir)?;
    if frames.is_empty() {
        log_fatal!("no frames found in {}", frames_dir.display());
    }
    let [height, width, _] = load_rgb(&frames[0])?
        .dims::<3>()
        .ok_or("first frame is not an RGB image")?;

    log::info!("model: {}", model_path.display());
    log::info!("frames: {} ({} files, {}x{})", frames_dir.display(), frames.len(), width, height);
    log::info!("controls: R reset, Up/Down filter window, Left/Right threshold, ESC exit");

    let mut tuning = Tuning::new(config.filter_window(), config.confidence_threshold());
    let backend = OnnxBackend::new(device);
    let mut tracker = PoseTracker::new(ModelSource::File(model_path), &backend, config)?;

    let mut window = Window::new(
        "Video Pose - ESC to exit",
        width,
        height,
        WindowOptions::default(),
    )?;
    window.set_target_fps(30);

    let mut next = 0;
    while window.is_open() && !window.is_key_down(Key::Escape) {
        for action in window
            .get_keys_pressed(KeyRepeat::No)
            .into_iter()
            .filter_map(Action::from_key)
        {
            if action == Action::Reset {
                tracker.reset();
            } else if tuning.apply(action) {
                tracker.set_filter_window(tuning.window);
                tracker.set_confidence_percent(tuning.threshold_percent as f32)?;
                log::info!(
                    "filter window {}, threshold {}%",
                    tuning.window,
                    tuning.threshold_percent
                );
            }
        }

        // Wrapping back to the first frame is a seek
        if next == frames.len() {
            next = 0;
            tracker.reset();
        }
        let path = &frames[next];
        next += 1;

        let image = match load_rgb(path) {
            Ok(image) if image.shape == [height, width, 3] => image,
            Ok(image) => {
                log::warn!("skipping {}: size {:?} differs", path.display(), image.shape);
                window.update();
                continue;
            }
            Err(err) => {
                log::warn!("skipping {}: {}", path.display(), err);
                window.update();
                continue;
            }
        };

        if tracker.track(&image.to_f32()).is_err() {
            window.update();
            continue;
        }

        let mut canvas = FrameCanvas::new(image.data, width, height);
        tracker.render(&mut canvas);
        canvas.draw_keypoints(tracker.frame(), KEYPOINT_RADIUS);
        window.update_with_buffer(&canvas.to_argb(), width, height)?;
    }

    log::info!("exiting");
    Ok(())
}
