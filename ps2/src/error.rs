use core::fmt;

/*
 * Receive-side framing failures. Each one parks the decoder
 * until it is reset.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxError {
    StartBit,
    Overrun,
    Parity,
    StopBit,
}

impl RxError {
    pub(crate) const fn code(self) -> u8 {
        match self {
            RxError::StartBit => 1,
            RxError::Overrun => 2,
            RxError::Parity => 3,
            RxError::StopBit => 4,
        }
    }

    pub(crate) const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(RxError::StartBit),
            2 => Some(RxError::Overrun),
            3 => Some(RxError::Parity),
            4 => Some(RxError::StopBit),
            _ => None,
        }
    }
}

impl fmt::Display for RxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RxError::StartBit => f.write_str("start bit error"),
            RxError::Overrun => f.write_str("receive buffer overrun"),
            RxError::Parity => f.write_str("parity error"),
            RxError::StopBit => f.write_str("stop bit error"),
        }
    }
}

/* Where a host-to-device transfer stalled */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStage {
    /* Device never started clocking after the request to send */
    RequestToSend,
    /* Waiting on the clock around bit n (8 = parity, 9 = stop) */
    Bit(u8),
    /* Waiting on the acknowledge pulse or the bus going idle after it */
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxError {
    Timeout { stage: TxStage },
    /* Device released the clock without pulling data low */
    NoAck,
}

impl fmt::Display for TxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxError::Timeout { stage: TxStage::RequestToSend } => {
                f.write_str("device did not clock the request to send")
            }
            TxError::Timeout { stage: TxStage::Bit(n) } => write!(f, "clock stalled at bit {}", n),
            TxError::Timeout { stage: TxStage::Ack } => f.write_str("clock stalled in acknowledge"),
            TxError::NoAck => f.write_str("device did not acknowledge"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /* Parameter outside the command's legal range; nothing was sent */
    InvalidParameter { command: u8, value: u8 },
    Transmit(TxError),
    /* Keyboard sent nothing back in time */
    NoResponse { command: u8 },
}

impl CommandError {
    /*
     * response_code - The keyboard reply byte this failure stands in for.
     * Every failure reads as "resend" to a caller that only inspects reply
     * codes.
     */
    pub const fn response_code(&self) -> u8 {
        crate::command::reply::RESEND
    }
}

impl From<TxError> for CommandError {
    fn from(err: TxError) -> Self {
        CommandError::Transmit(err)
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::InvalidParameter { command, value } => {
                write!(f, "invalid parameter {:#04x} for command {:#04x}", value, command)
            }
            CommandError::Transmit(err) => write!(f, "transmit failed: {}", err),
            CommandError::NoResponse { command } => {
                write!(f, "no response to command {:#04x}", command)
            }
        }
    }
}
