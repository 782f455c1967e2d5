// Record command kinds.
//
// The 3-bit command code selects how a record produces output.  Code 7 is
// unassigned; the 0xFF end marker is not a command and is handled by the
// header layer.

use std::fmt;

/// Operation selected by a record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Command {
    /// Copy `length` raw bytes from the stream.
    Literal,
    /// Repeat one byte `length` times.
    RunByte,
    /// Repeat a 2-byte pattern `length` times.
    RunWord,
    /// Emit `n, n+1, ...` (wrapping) for `length` bytes.
    RunIncrement,
    /// Copy `length` already-decoded bytes from an absolute offset.
    BackRef,
    /// Like `BackRef`, with every byte bit-reversed.
    MirrorBackRef,
    /// Copy `length` already-decoded bytes walking backward from an offset.
    ReverseBackRef,
}

impl Command {
    /// All commands, ordered by code.
    pub const ALL: [Command; 7] = [
        Command::Literal,
        Command::RunByte,
        Command::RunWord,
        Command::RunIncrement,
        Command::BackRef,
        Command::MirrorBackRef,
        Command::ReverseBackRef,
    ];

    /// 3-bit wire code.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Map a wire code back to a command. Returns `None` for code 7.
    #[inline]
    pub const fn from_code(code: u8) -> Option<Command> {
        match code {
            0 => Some(Command::Literal),
            1 => Some(Command::RunByte),
            2 => Some(Command::RunWord),
            3 => Some(Command::RunIncrement),
            4 => Some(Command::BackRef),
            5 => Some(Command::MirrorBackRef),
            6 => Some(Command::ReverseBackRef),
            _ => None,
        }
    }

    /// Fixed payload width in bytes. `None` for `Literal`, whose payload
    /// is `length` bytes.
    pub const fn payload_width(self) -> Option<usize> {
        match self {
            Command::Literal => None,
            Command::RunByte | Command::RunIncrement => Some(1),
            Command::RunWord
            | Command::BackRef
            | Command::MirrorBackRef
            | Command::ReverseBackRef => Some(2),
        }
    }

    /// Decoded bytes produced per unit of header length.
    #[inline]
    pub const fn unit_size(self) -> usize {
        match self {
            Command::RunWord => 2,
            _ => 1,
        }
    }

    /// True for the three commands that reference earlier output.
    pub const fn is_back_reference(self) -> bool {
        matches!(
            self,
            Command::BackRef | Command::MirrorBackRef | Command::ReverseBackRef
        )
    }

    /// Short display name.
    pub const fn name(self) -> &'static str {
        match self {
            Command::Literal => "literal",
            Command::RunByte => "run-byte",
            Command::RunWord => "run-word",
            Command::RunIncrement => "run-increment",
            Command::BackRef => "back-ref",
            Command::MirrorBackRef => "mirror-back-ref",
            Command::ReverseBackRef => "reverse-back-ref",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_roundtrip() {
        for (i, cmd) in Command::ALL.iter().enumerate() {
            assert_eq!(cmd.code() as usize, i);
            assert_eq!(Command::from_code(cmd.code()), Some(*cmd));
        }
        assert_eq!(Command::from_code(7), None);
    }

    #[test]
    fn payload_widths() {
        assert_eq!(Command::Literal.payload_width(), None);
        assert_eq!(Command::RunByte.payload_width(), Some(1));
        assert_eq!(Command::RunIncrement.payload_width(), Some(1));
        assert_eq!(Command::RunWord.payload_width(), Some(2));
        assert_eq!(Command::ReverseBackRef.payload_width(), Some(2));
    }

    #[test]
    fn only_run_word_doubles_units() {
        for cmd in Command::ALL {
            let expected = if cmd == Command::RunWord { 2 } else { 1 };
            assert_eq!(cmd.unit_size(), expected, "{cmd}");
        }
    }
}
