//! NovumOS Kernel Entry Point
//!
//! Boots the console subsystem on bare-metal x86_64 and runs the sample
//! programs one after the other as the foreground console owner.

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
mod kernel_main {
    extern crate alloc;

    use alloc::boxed::Box;
    use bootloader::{entry_point, BootInfo};
    use core::panic::PanicInfo;
    use log::LevelFilter;
    use novum_kernel::arch::x86_64::{self, interrupts, VgaDisplay};
    use novum_kernel::boot::{self, Status};
    use novum_kernel::task::{Executor, Priority, Task};
    use novum_kernel::{serial_println, KernelConfig};
    use ::x86_64::VirtAddr;

    entry_point!(kernel_main);

    /// Kernel entry point.
    ///
    /// Called by the bootloader after setting up the initial environment.
    fn kernel_main(boot_info: &'static BootInfo) -> ! {
        let config = KernelConfig::default().with_log_level(if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        });

        // ====================================================================
        // Phase 1: Serial log and heap
        // ====================================================================
        novum_kernel::init_platform();
        if let Err(err) = novum_kernel::logger::init(config.log_level) {
            serial_println!("logger already installed: {}", err);
        }

        let phys_mem_offset = VirtAddr::new(boot_info.physical_memory_offset);
        // SAFETY: the bootloader maps all physical memory at this offset
        // (`map_physical_memory` feature) and we build the mapper only once.
        let mut mapper = unsafe { novum_kernel::memory::init_mapper(phys_mem_offset) };
        // SAFETY: the bootloader's memory map marks only unused frames usable.
        let mut frame_allocator = unsafe {
            novum_kernel::memory::BootInfoFrameAllocator::init(&boot_info.memory_map)
        };
        novum_kernel::allocator::init_heap(&mut mapper, &mut frame_allocator)
            .expect("heap initialization failed");

        // ====================================================================
        // Phase 2: Console and keyboard
        // ====================================================================
        // SAFETY: this is the only VgaDisplay; the console owns it from here on.
        let display = unsafe { VgaDisplay::new() };
        let kernel = novum_kernel::init(Box::new(display), &config);
        kernel.console.lock().clear();
        boot::banner::print_banner();

        boot::log(Status::Ok, "Serial log initialized");
        boot::log(Status::Ok, "Kernel heap ready");
        boot::log(Status::Ok, "Console ready (80x25 text)");

        interrupts::init();
        boot::log(Status::Ok, "Interrupts enabled");
        boot::log_detail(&alloc::format!(
            "keyboard queue: {} keys, drop-oldest",
            kernel.keyboard.capacity()
        ));

        // ====================================================================
        // Phase 3: Foreground programs
        // ====================================================================
        let mut executor = Executor::new();
        executor.spawn(Task::with_priority(
            async move {
                let status = kernel.launch(|sys| hello_app::main(sys)).await;
                log::info!("hello: {}", status);
                let status = kernel.launch(|sys| calculator_app::main(sys)).await;
                log::info!("calculator: {}", status);

                kernel.console.lock().clear();
                boot::log(Status::Info, "All programs finished. System idle.");
            },
            Priority::High,
        ));

        executor.run();
    }

    /// Panic handler.
    ///
    /// Called when the kernel encounters an unrecoverable error.
    #[panic_handler]
    fn panic(info: &PanicInfo) -> ! {
        serial_println!("KERNEL PANIC: {}", info);
        x86_64::halt_loop()
    }
}

#[cfg(not(target_os = "none"))]
fn main() {
    eprintln!("novum-kernel is a bare-metal image; build it for x86_64-unknown-none via bootimage");
}
