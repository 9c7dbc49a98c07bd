use crate::io::*;
use core::fmt::Write;
use spin::{Mutex, Once};

//COM1 serial port base address
const COM1: u16 = 0x3F8;

//Serial port register offsets
const DATA_REG: u16 = 0; //Data register / divisor low
const INT_EN_REG: u16 = 1; //Interrupt enable register / divisor high
const FIFO_REG: u16 = 2; //FIFO control register
const LINE_CTRL_REG: u16 = 3; //Line control register
const MODEM_CTRL_REG: u16 = 4; //Modem control register
const LINE_STATUS_REG: u16 = 5; //Line status register

//Line status: transmit holding register empty
const LSR_THR_EMPTY: u8 = 0x20;

pub struct SerialPort {
	base: u16,
}

impl SerialPort {
	pub const fn new(base: u16) -> Self {
		SerialPort { base }
	}

	//115200 baud, 8N1, FIFO on; the console never interrupts
	unsafe fn init(&self) {
		unsafe {
			outb(self.base + INT_EN_REG, 0x00); //Disable interrupts
			outb(self.base + LINE_CTRL_REG, 0x80); //Enable DLAB
			outb(self.base + DATA_REG, 0x01); //Divisor low byte
			outb(self.base + INT_EN_REG, 0x00); //Divisor high byte
			outb(self.base + LINE_CTRL_REG, 0x03); //8N1
			outb(self.base + FIFO_REG, 0xC7); //Enable FIFO, clear, 14 byte threshold
			outb(self.base + MODEM_CTRL_REG, 0x03); //DTR + RTS, no IRQ
		}
	}

	fn is_transmit_empty(&self) -> bool {
		unsafe { inb(self.base + LINE_STATUS_REG) & LSR_THR_EMPTY != 0 }
	}

	pub fn write_byte(&mut self, byte: u8) {
		while !self.is_transmit_empty() {
			core::hint::spin_loop();
		}
		unsafe {
			outb(self.base + DATA_REG, byte);
		}
	}
}

impl Write for SerialPort {
	fn write_str(&mut self, s: &str) -> core::fmt::Result {
		for byte in s.bytes() {
			if byte == b'\n' {
				self.write_byte(b'\r');
			}
			self.write_byte(byte);
		}
		Ok(())
	}
}

static SERIAL_PORT: Once<Mutex<SerialPort>> = Once::new();

//Bring up COM1 once; later calls are no-ops
pub fn init_serial() {
	SERIAL_PORT.call_once(|| {
		let port = SerialPort::new(COM1);
		unsafe {
			port.init();
		}
		Mutex::new(port)
	});
}

#[macro_export]
macro_rules! serial_print {
	($($arg:tt)*) => {
		$crate::serial::_serial_print(format_args!($($arg)*))
	};
}

#[macro_export]
macro_rules! serial_println {
	() => ($crate::serial_print!("\n"));
	($($arg:tt)*) => {
		$crate::serial_print!("{}\n", format_args!($($arg)*))
	};
}

//Dropped until init_serial() has run
#[doc(hidden)]
pub fn _serial_print(args: core::fmt::Arguments) {
	if let Some(serial) = SERIAL_PORT.get() {
		let _ = serial.lock().write_fmt(args);
	}
}
