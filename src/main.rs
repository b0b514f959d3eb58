use std::ffi::OsString;
use std::fs::File;
use std::io::{self, ErrorKind, Read, Write};

use clap::{Parser, ValueEnum};
use utfstr::{transcode, Decoder, Encoder, Encoding, Mode, NativeUnit, UtfError, Utf16, Utf32, Utf8, BYTE_ORDER_MARK};

const HELP_TEXT: &str = "Converts files or standard IO streams between UTF-8, UTF-16 and UTF-32.

Malformed input is converted to U+FFFD rather than rejected. Reading plain utf16 or utf32
honors a leading byte order mark, and assumes big endian without one. A mark read from a
UTF-16 or UTF-32 input is written again to a UTF-16 or UTF-32 output.

EXIT CODES:
0 - if completed normally
1 - if an IO error has occured
2 - if an encoding error has occured (input isn't a whole number of units)
";

#[derive(Debug, Parser)]
#[command(version, about = HELP_TEXT)]
struct Opts {
    /// Encoding of the input.
    #[arg(short, long, value_enum, default_value_t = Enc::Utf8)]
    from: Enc,
    /// Encoding of the output. Plain utf16 and utf32 write big endian.
    #[arg(short, long, value_enum, default_value_t = Enc::Utf16)]
    to: Enc,
    /// Start a UTF-16 or UTF-32 output with a byte order mark.
    #[arg(short, long)]
    bom: bool,
    /// The input file. Defaults to stdin if '-' or not set
    input: Option<OsString>,
    /// The output file. Defaults to stdout if '-' or not set
    output: Option<OsString>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Enc {
    Utf8,
    Utf16,
    Utf16be,
    Utf16le,
    Utf32,
    Utf32be,
    Utf32le,
}

impl Enc {
    fn mode(self) -> Mode {
        match self {
            Enc::Utf16be | Enc::Utf32be => Mode::BigEndian,
            Enc::Utf16le | Enc::Utf32le => Mode::LittleEndian,
            Enc::Utf8 | Enc::Utf16 | Enc::Utf32 => Mode::Unresolved,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum ConvError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("encoding error: {len} byte input is not a whole number of {width} byte units")]
    Truncated { len: usize, width: usize },
    #[error("encoding error: {0}")]
    Utf(#[from] UtfError),
}

const EXITCODE_SUCCESS: i32 = 0;
const EXITCODE_ERROR_IO: i32 = 1;
const EXITCODE_ERROR_ENCODING: i32 = 2;

/// Native units as raw bytes, in whatever order they are stored.
trait RawUnit: NativeUnit {
    const WIDTH: usize;
    fn from_chunk(chunk: &[u8]) -> Self;
    fn push_to(self, out: &mut Vec<u8>);
}

macro_rules! impl_raw_unit {
    ($($unit:ty),+) => {$(
        impl RawUnit for $unit {
            const WIDTH: usize = std::mem::size_of::<$unit>();
            fn from_chunk(chunk: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$unit>()];
                raw.copy_from_slice(chunk);
                <$unit>::from_ne_bytes(raw)
            }
            fn push_to(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_ne_bytes());
            }
        }
    )+};
}
impl_raw_unit!(u8, u16, u32);

fn main() {
    env_logger::Builder::from_env(env_logger::Env::new().filter("UTFCONV_LOG")).init();
    let exit_code = real_main();
    std::process::exit(exit_code)
}

fn real_main() -> i32 {
    let opts = Opts::parse();

    let result = read_input(opts.input.as_ref())
        .and_then(|bytes| convert_from(&bytes, &opts))
        .and_then(|bytes| write_output(opts.output.as_ref(), &bytes));

    match result {
        Ok(()) => EXITCODE_SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            match e {
                ConvError::Io(_) => EXITCODE_ERROR_IO,
                ConvError::Truncated { .. } | ConvError::Utf(_) => EXITCODE_ERROR_ENCODING,
            }
        }
    }
}

fn is_stdio(path: Option<&OsString>) -> bool {
    path.map_or(true, |p| p.to_str() == Some("-"))
}

fn read_input(path: Option<&OsString>) -> Result<Vec<u8>, ConvError> {
    let mut bytes = Vec::new();
    match path {
        Some(file) if !is_stdio(path) => {
            File::open(file)?.read_to_end(&mut bytes)?;
        }
        _ => {
            io::stdin().lock().read_to_end(&mut bytes)?;
        }
    }
    log::debug!("read {} input bytes", bytes.len());
    Ok(bytes)
}

fn write_output(path: Option<&OsString>, bytes: &[u8]) -> Result<(), ConvError> {
    let written = match path {
        Some(file) if !is_stdio(path) => File::create(file).and_then(|mut f| f.write_all(bytes)),
        _ => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes).and_then(|()| stdout.flush())
        }
    };
    match written {
        // nobody is listening anymore, which isn't our problem
        Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
        other => Ok(other?),
    }
}

fn convert_from(input: &[u8], opts: &Opts) -> Result<Vec<u8>, ConvError> {
    match opts.from {
        Enc::Utf8 => convert_to::<Utf8>(input, opts),
        Enc::Utf16 | Enc::Utf16be | Enc::Utf16le => convert_to::<Utf16>(input, opts),
        Enc::Utf32 | Enc::Utf32be | Enc::Utf32le => convert_to::<Utf32>(input, opts),
    }
}

fn convert_to<F: Encoding>(input: &[u8], opts: &Opts) -> Result<Vec<u8>, ConvError>
where
    F::Unit: RawUnit,
{
    match opts.to {
        Enc::Utf8 => convert::<F, Utf8>(input, opts),
        Enc::Utf16 | Enc::Utf16be | Enc::Utf16le => convert::<F, Utf16>(input, opts),
        Enc::Utf32 | Enc::Utf32be | Enc::Utf32le => convert::<F, Utf32>(input, opts),
    }
}

fn convert<F: Encoding, T: Encoding>(input: &[u8], opts: &Opts) -> Result<Vec<u8>, ConvError>
where
    F::Unit: RawUnit,
    T::Unit: RawUnit,
{
    let width = <F::Unit as RawUnit>::WIDTH;
    if input.len() % width != 0 {
        return Err(ConvError::Truncated { len: input.len(), width });
    }
    let units: Vec<F::Unit> = input.chunks_exact(width).map(<F::Unit as RawUnit>::from_chunk).collect();

    let decoder = Decoder::<F>::with_mode(&units, opts.from.mode());
    let mut out = vec![<T::Unit as NativeUnit>::NUL; decoder.symbol_count() * T::MAX_WIDTH + 1];
    let mut encoder = Encoder::<T>::with_mode(&mut out, opts.to.mode());

    let written = if opts.bom && T::HAS_BOM {
        encoder.encode(BYTE_ORDER_MARK).map_err(UtfError::from)?;
        let mut source = decoder.clone();
        transcode(&mut source, &mut encoder).map_err(UtfError::from)?;
        encoder.offset()
    } else {
        encoder.assign(&decoder).map_err(UtfError::from)?
    };
    log::debug!(
        "{} -> {}: {} units in, {} units out ({})",
        F::NAME,
        T::NAME,
        units.len(),
        written,
        encoder.mode().name()
    );

    let mut bytes = Vec::with_capacity(written * <T::Unit as RawUnit>::WIDTH);
    for &unit in &out[..written] {
        unit.push_to(&mut bytes);
    }
    Ok(bytes)
}
