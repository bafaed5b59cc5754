mod active_sequence;
mod custom_button;
mod device_command;
mod device_record;
mod device_type;
pub(crate) mod lenient;
pub(crate) mod validation;

pub use {
    active_sequence::ActiveSequence, custom_button::CustomButton, device_command::DeviceCommand,
    device_record::DeviceRecord, device_type::DeviceType,
};

pub(crate) use device_record::normalize_address;
