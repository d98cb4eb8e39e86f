use std::fmt;

/// Execution device for the inference engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Device {
    #[default]
    Cpu,
    Cuda { device_id: i32 },
    TensorRt { device_id: i32, fp16: bool },
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "CPU"),
            Device::Cuda { device_id } => write!(f, "CUDA(device_id={device_id})"),
            Device::TensorRt { device_id, fp16 } => {
                write!(f, "TensorRT(device_id={device_id}, fp16={fp16})")
            }
        }
    }
}

impl Device {
    /// Parse `cpu`, `cuda`, `cuda:N`, `tensorrt`, `tensorrt:N` or `tensorrt-fp16:N`.
    pub fn parse(value: &str) -> Option<Device> {
        let value = value.trim().to_ascii_lowercase();
        let (kind, id) = match value.split_once(':') {
            Some((kind, id)) => (kind.to_string(), id.parse().ok()?),
            None => (value, 0),
        };
        match kind.as_str() {
            "cpu" => Some(Device::Cpu),
            "cuda" => Some(Device::Cuda { device_id: id }),
            "tensorrt" => Some(Device::TensorRt {
                device_id: id,
                fp16: false,
            }),
            "tensorrt-fp16" => Some(Device::TensorRt {
                device_id: id,
                fp16: true,
            }),
            _ => None,
        }
    }
}
