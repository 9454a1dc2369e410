#![allow(unsafe_code)]
//! Instance creation, adapter enumeration and swapchain creation (§4.1).
//!
//! Grounded on `vulkan_graphics_api.rs`: `ash::Entry::new()`, instance creation via
//! `vk::ApplicationInfo`/`vk::InstanceCreateInfo` builders, and an optional `DebugReport`
//! callback gated on a runtime flag rather than `cfg!(debug_assertions)` (§4.1 "validation is a
//! factory-wide, runtime-toggled concern").

use std::ffi;
use std::os::raw;
use std::sync::Arc;

use ash::extensions::ext::DebugReport;
use ash::version::{EntryV1_0, InstanceV1_0};
use ash::vk;
use log::{debug, warn};

use crate::config::RhiConfig;
use crate::error::{Result, RhiError};
use crate::rhi::structs::SwapchainDesc;
use crate::rhi::traits::Factory;
use crate::rhi::vulkan::device::VulkanDevice;
use crate::rhi::vulkan::queue::VulkanCommandQueue;
use crate::rhi::vulkan::swapchain::VulkanSwapchain;
use crate::rhi::vulkan::Vulkan;
use crate::surface::Surface;

unsafe extern "system" fn debug_callback(
    _flags: vk::DebugReportFlagsEXT,
    _object_type: vk::DebugReportObjectTypeEXT,
    _object: u64,
    _location: usize,
    _message_code: i32,
    _layer_prefix: *const raw::c_char,
    message: *const raw::c_char,
    _user_data: *mut raw::c_void,
) -> u32 {
    debug!("{:?}", ffi::CStr::from_ptr(message));
    vk::FALSE
}

#[cfg(all(unix, not(target_os = "android")))]
fn platform_surface_extensions() -> Vec<*const raw::c_char> {
    vec![ash::extensions::khr::XlibSurface::name().as_ptr(), ash::extensions::khr::Surface::name().as_ptr()]
}

#[cfg(windows)]
fn platform_surface_extensions() -> Vec<*const raw::c_char> {
    vec![ash::extensions::khr::Win32Surface::name().as_ptr(), ash::extensions::khr::Surface::name().as_ptr()]
}

fn validation_layer_names() -> Vec<ffi::CString> {
    vec![ffi::CString::new("VK_LAYER_KHRONOS_validation").unwrap()]
}

/// The root Vulkan object: owns the instance and optional debug-report callback, and enumerates
/// physical devices into [`VulkanDevice`]s (§4.1).
pub struct VulkanFactory {
    entry: ash::Entry,
    instance: ash::Instance,
    debug_report_loader: Option<DebugReport>,
    debug_callback: Option<vk::DebugReportCallbackEXT>,
    validation_enabled: bool,
}

impl VulkanFactory {
    /// Creates a Vulkan instance, installing a debug-report callback when
    /// `config.enable_validation` is set.
    pub fn new(application_name: &str, config: &RhiConfig) -> Result<VulkanFactory> {
        let entry = ash::Entry::new().map_err(|err| RhiError::unsupported(format!("failed to load Vulkan: {}", err)))?;

        let app_name = ffi::CString::new(application_name).unwrap_or_default();
        let engine_name = ffi::CString::new("vkrhi").unwrap();

        let application_info = vk::ApplicationInfo::builder()
            .application_name(&app_name)
            .application_version(ash::vk_make_version!(1, 0, 0))
            .engine_name(&engine_name)
            .engine_version(ash::vk_make_version!(1, 0, 0))
            .api_version(ash::vk_make_version!(1, 1, 0))
            .build();

        let layer_names = if config.enable_validation { validation_layer_names() } else { Vec::new() };
        let layer_names_raw: Vec<*const raw::c_char> = layer_names.iter().map(|name| name.as_ptr()).collect();

        let mut extension_names_raw = platform_surface_extensions();
        if config.enable_validation {
            extension_names_raw.push(DebugReport::name().as_ptr());
        }

        let instance_create_info = vk::InstanceCreateInfo::builder()
            .application_info(&application_info)
            .enabled_layer_names(&layer_names_raw)
            .enabled_extension_names(&extension_names_raw)
            .build();

        let instance = unsafe { entry.create_instance(&instance_create_info, None) }
            .map_err(|err| RhiError::unsupported(format!("failed to create Vulkan instance: {:?}", err)))?;

        let (debug_report_loader, debug_callback) = if config.enable_validation {
            let loader = DebugReport::new(&entry, &instance);
            let debug_info = vk::DebugReportCallbackCreateInfoEXT::builder()
                .flags(
                    vk::DebugReportFlagsEXT::ERROR
                        | vk::DebugReportFlagsEXT::WARNING
                        | vk::DebugReportFlagsEXT::PERFORMANCE_WARNING,
                )
                .pfn_callback(Some(debug_callback));
            match unsafe { loader.create_debug_report_callback(&debug_info, None) } {
                Ok(callback) => (Some(loader), Some(callback)),
                Err(err) => {
                    warn!("failed to install Vulkan debug-report callback: {:?}", err);
                    (None, None)
                }
            }
        } else {
            (None, None)
        };

        Ok(VulkanFactory {
            entry,
            instance,
            debug_report_loader,
            debug_callback,
            validation_enabled: config.enable_validation,
        })
    }

    pub(crate) fn entry(&self) -> &ash::Entry {
        &self.entry
    }

    pub(crate) fn instance(&self) -> &ash::Instance {
        &self.instance
    }
}

impl Drop for VulkanFactory {
    fn drop(&mut self) {
        unsafe {
            if let (Some(loader), Some(callback)) = (&self.debug_report_loader, self.debug_callback) {
                loader.destroy_debug_report_callback(callback, None);
            }
            self.instance.destroy_instance(None);
        }
    }
}

impl Factory<Vulkan> for VulkanFactory {
    fn enumerate_devices(&self) -> Result<Vec<VulkanDevice>> {
        let physical_devices = unsafe { self.instance.enumerate_physical_devices() }
            .map_err(|err| RhiError::unsupported(format!("failed to enumerate physical devices: {:?}", err)))?;

        physical_devices
            .into_iter()
            .map(|physical_device| VulkanDevice::new(self.instance.clone(), physical_device, self.validation_enabled))
            .collect()
    }

    fn create_swapchain<W: Surface<vk::SurfaceKHR>>(
        &self,
        device: &VulkanDevice,
        queue: &VulkanCommandQueue,
        window: &mut W,
        desc: &mut SwapchainDesc,
    ) -> Result<VulkanSwapchain> {
        let surface_loader = ash::extensions::khr::Surface::new(&self.entry, &self.instance);
        let surface = window
            .platform_object()
            .map_err(|err| RhiError::invalid_argument(format!("failed to obtain native surface: {}", err)))?;

        let present_supported = unsafe {
            surface_loader.get_physical_device_surface_support(device.physical_device(), queue.inner.family_index, surface)
        };
        if !present_supported {
            return Err(RhiError::unsupported("present on a non-present queue family"));
        }

        VulkanSwapchain::new(device, queue, surface_loader, surface, desc, None)
    }

    fn validation_enabled(&self) -> bool {
        self.validation_enabled
    }
}

/// Thin wrapper type alias kept so call sites can share one `Arc` to the instance without
/// depending on `VulkanFactory`'s lifetime directly (device/swapchain objects outlive the factory
/// reference passed to their constructors).
pub(crate) type SharedInstance = Arc<ash::Instance>;
