#![no_std]
#![no_main]
#![feature(abi_x86_interrupt)]

use core::panic::PanicInfo;
use firmware::{Bridge, BridgeConfig};
use hal::cpu::{self, CpuIrqMask, TscClock};
use hal::logger::init_logger;
use hal::lpt::{LPT1_IRQ, LptAppleBus, LptPs2Lines};
use hal::pit;
use hal::serial_println;
use hal::watchdog::SoftWatchdog;
use lazy_static::lazy_static;
use limine::BaseRevision;
use log::{LevelFilter, info};
use pic8259::ChainedPics;
use ps2::{Ps2Host, Ps2Port};
use spin::Mutex;
use x86_64::structures::idt::{InterruptDescriptorTable, InterruptStackFrame};

const CONFIG: BridgeConfig = BridgeConfig::DEFAULT;

const PIC_1_OFFSET: u8 = 32;
const PIC_2_OFFSET: u8 = PIC_1_OFFSET + 8;
const TIMER_IRQ: u8 = 0;
const TIMER_VECTOR: u8 = PIC_1_OFFSET + TIMER_IRQ;
const LPT_VECTOR: u8 = PIC_1_OFFSET + LPT1_IRQ;

//Watchdog tick rate; the watchdog counts in milliseconds
const TICK_HZ: u32 = 1000;

static BASE_REVISION: BaseRevision = BaseRevision::new();

//Shared with the LPT interrupt
static PS2_PORT: Ps2Port = Ps2Port::new();
//Shared with the timer interrupt
static WATCHDOG: SoftWatchdog = SoftWatchdog::new(1000 / TICK_HZ);

static PICS: Mutex<ChainedPics> =
    Mutex::new(unsafe { ChainedPics::new(PIC_1_OFFSET, PIC_2_OFFSET) });

lazy_static! {
    static ref IDT: InterruptDescriptorTable = {
        let mut idt = InterruptDescriptorTable::new();
        idt.double_fault.set_handler_fn(double_fault_handler);
        idt[TIMER_VECTOR].set_handler_fn(timer_interrupt_handler);
        idt[LPT_VECTOR].set_handler_fn(ps2_clock_interrupt_handler);
        idt
    };
}

//Falling edge on the PS/2 clock, seen through nACK
extern "x86-interrupt" fn ps2_clock_interrupt_handler(_stack: InterruptStackFrame) {
    let (clock_high, data_high) = LptPs2Lines::sample(CONFIG.lpt_base);
    //IRQ7 also fires spuriously; only a low clock is a real edge
    if !clock_high {
        PS2_PORT.on_clock_falling(data_high);
    }
    unsafe {
        PICS.lock().notify_end_of_interrupt(LPT_VECTOR);
    }
}

extern "x86-interrupt" fn timer_interrupt_handler(_stack: InterruptStackFrame) {
    let expired = WATCHDOG.tick();
    unsafe {
        PICS.lock().notify_end_of_interrupt(TIMER_VECTOR);
    }
    if expired {
        serial_println!("[WATCHDOG] main loop stalled, resetting");
        cpu::reset_system();
    }
}

extern "x86-interrupt" fn double_fault_handler(stack: InterruptStackFrame, _err: u64) -> ! {
    serial_println!(
        "Double fault at instruction pointer: {:#x}",
        stack.instruction_pointer.as_u64()
    );
    cpu::reset_system();
}

//A dead bridge is no use to the Apple II: report and start over
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    serial_println!("[FIRMWARE PANIC]");
    if let Some(loc) = info.location() {
        serial_println!("Location: {}:{}", loc.file(), loc.line());
    }
    serial_println!("{}", info.message());
    cpu::reset_system();
}

#[unsafe(no_mangle)]
pub extern "C" fn _start() -> ! {
    hal::init_serial();
    if init_logger(LevelFilter::Info).is_err() {
        serial_println!("Logger already installed");
    }

    if !BASE_REVISION.is_supported() {
        serial_println!("Unsupported limine base revision");
        cpu::halt_loop();
    }

    cpu::disable_interrupts();
    IDT.load();
    unsafe {
        let mut pics = PICS.lock();
        pics.initialize();
        //Unmask the timer and the parallel port only
        pics.write_masks(!((1 << TIMER_IRQ) | (1 << LPT1_IRQ)), 0xFF);
        pit::init_periodic(TICK_HZ);
    }

    let mut lines = LptPs2Lines::new(CONFIG.lpt_base);
    unsafe {
        lines.init();
    }
    info!("firmware: PS/2 on LPT {:#x}, IRQ {}", CONFIG.lpt_base, LPT1_IRQ);
    //Interrupts stay off until the first command is sent; the
    //transmitter turns them on after every send
    let host = Ps2Host::new(
        &PS2_PORT,
        lines,
        CpuIrqMask,
        TscClock::new(CONFIG.tsc_mhz),
        CONFIG.ps2,
    );
    let mut bridge = Bridge::new(host, LptAppleBus::new(CONFIG.lpt_base), &WATCHDOG, CONFIG);
    bridge.startup();
    bridge.run()
}
