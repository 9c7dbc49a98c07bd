/*
 * Dispatch loop
 *
 * Bridge owns every main-loop resource: the host end of the PS/2 link, the
 * translator's modifier state, the Apple II output latch and the watchdog. The
 * receive interrupt only ever touches the shared Ps2Port.
 */

use apple2::AppleWriter;
use hal::clock::Clock;
use hal::lines::{IrqMask, ParallelBus, Ps2Lines, Watchdog};
use keyboard::{ScanSource, Translator};
use log::{debug, info, trace, warn};
use ps2::command::reply;
use ps2::{CommandError, Ps2Host, Ps2Port, SCAN_BUFFER_LEN};

use crate::config::BridgeConfig;

/*
 * Scan codes straight from the receive ring. Follow-up bytes of an escape
 * sequence get a bounded wait.
 */
pub struct PortSource<'a, C: ?Sized, const N: usize = SCAN_BUFFER_LEN> {
    port: &'a Ps2Port<N>,
    clock: &'a C,
    escape_timeout_us: u32,
}

impl<'a, C: Clock + ?Sized, const N: usize> PortSource<'a, C, N> {
    pub fn new(port: &'a Ps2Port<N>, clock: &'a C, escape_timeout_us: u32) -> Self {
        Self {
            port,
            clock,
            escape_timeout_us,
        }
    }
}

impl<C: Clock + ?Sized, const N: usize> ScanSource for PortSource<'_, C, N> {
    fn poll(&mut self) -> Option<u8> {
        self.port.try_recv()
    }

    fn wait(&mut self) -> Option<u8> {
        match self.port.recv_timeout(self.clock, self.escape_timeout_us) {
            Ok(code) => Some(code),
            Err(_) => {
                debug!("bridge: escape sequence cut short");
                None
            }
        }
    }
}

pub struct Bridge<'p, L, I, C, B, W, const N: usize = SCAN_BUFFER_LEN> {
    host: Ps2Host<'p, L, I, C, N>,
    translator: Translator,
    writer: AppleWriter<B>,
    watchdog: W,
    config: BridgeConfig,
}

impl<'p, L, I, C, B, W, const N: usize> Bridge<'p, L, I, C, B, W, N>
where
    L: Ps2Lines,
    I: IrqMask,
    C: Clock,
    B: ParallelBus,
    W: Watchdog,
{
    /*
     * new - Takes over the Apple II bus (strobe idle high) but leaves the
     * watchdog stopped until startup has run.
     */
    pub fn new(host: Ps2Host<'p, L, I, C, N>, bus: B, watchdog: W, config: BridgeConfig) -> Self {
        Self {
            host,
            translator: Translator::new(),
            writer: AppleWriter::new(bus, config.apple),
            watchdog,
            config,
        }
    }

    pub fn host(&self) -> &Ps2Host<'p, L, I, C, N> {
        &self.host
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn writer(&self) -> &AppleWriter<B> {
        &self.writer
    }

    /*
     * startup - One-time keyboard setup. Failed steps are logged and skipped;
     * the bridge runs with whatever the keyboard accepted.
     */
    pub fn startup(&mut self) {
        let cfg = self.config;

        info!("bridge: waiting {} ms for keyboard self test", cfg.power_on_delay_ms);
        self.host.clock().delay_ms(cfg.power_on_delay_ms);

        //Self test result and early keys would be taken for command replies
        while let Some(stale) = self.host.recv() {
            debug!("bridge: discarded {:#04x} queued before setup", stale);
        }

        if let Err(err) = self.host.led_test(cfg.led_test_step_ms) {
            warn!("bridge: LED test: {}", err);
        }
        report("typematic", self.host.set_typematic(cfg.typematic));
        report("scan code set", self.host.set_scan_code_set(cfg.scan_code_set));
        report("power LED", self.host.set_leds(cfg.power_leds));

        self.watchdog.start(cfg.watchdog_timeout_ms);
        self.host.enable_interrupts();
        info!("bridge: ready");
    }

    /*
     * poll_once - One pass of the main loop: feed the watchdog, resync a
     * failed receiver, translate at most one key event and send it to the
     * Apple II. Returns the code written, if any.
     */
    pub fn poll_once(&mut self) -> Option<u8> {
        self.watchdog.feed();

        if let Some(err) = self.host.recover(self.config.resync_quiet_ms) {
            warn!("bridge: receiver reset after {}", err);
        }

        let code = {
            let mut source =
                PortSource::new(self.host.port(), self.host.clock(), self.config.escape_timeout_us);
            self.translator.poll(&mut source)?
        };

        match self.writer.write(self.host.clock(), code) {
            Ok(()) => {
                trace!("bridge: key {:#04x}", code);
                Some(code)
            }
            Err(err) => {
                warn!("bridge: {}", err);
                None
            }
        }
    }

    pub fn run(&mut self) -> ! {
        loop {
            self.poll_once();
        }
    }
}

fn report(step: &str, result: Result<u8, CommandError>) {
    match result {
        Ok(reply::ACK) => debug!("bridge: {} set", step),
        Ok(other) => warn!("bridge: {} answered {:#04x}", step, other),
        Err(err) => warn!("bridge: {}: {}", step, err),
    }
}
