use std::{env, fs::File, process::ExitCode};

use memmap::Mmap;
use oclass_class_file::{ClassFile, ErrorKind, JdkVersion};

const EXIT_USAGE: u8 = 2;
const EXIT_OPEN: u8 = 3;
const EXIT_MAP: u8 = 4;
const EXIT_TRUNCATED: u8 = 5;
const EXIT_FORMAT: u8 = 6;
const EXIT_VERSION: u8 = 7;
const EXIT_UTF8: u8 = 8;

fn main() -> ExitCode {
    pretty_env_logger::init();

    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: oclass <class-file>");
        return ExitCode::from(EXIT_USAGE);
    };

    let file = match File::open(&path) {
        Ok(file) => file,
        Err(err) => {
            log::error!("{}: {}", path, err);
            return ExitCode::from(EXIT_OPEN);
        }
    };
    let mmap = match unsafe { Mmap::map(&file) } {
        Ok(mmap) => mmap,
        Err(err) => {
            log::error!("{}: {}", path, err);
            return ExitCode::from(EXIT_MAP);
        }
    };

    match ClassFile::parse(&mmap, JdkVersion::Jdk1_7) {
        Ok(class_file) => {
            print_summary(&class_file);
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{}: {}", path, err);
            ExitCode::from(match err.kind() {
                ErrorKind::TruncatedFile => EXIT_TRUNCATED,
                ErrorKind::ClassFileFormat => EXIT_FORMAT,
                ErrorKind::ClassFileVersion => EXIT_VERSION,
                ErrorKind::Utf8Encoding => EXIT_UTF8,
            })
        }
    }
}

fn print_summary(class_file: &ClassFile) {
    println!(
        "Class file version {}.{}",
        class_file.major_version, class_file.minor_version
    );
    println!(
        "Class:      {}",
        class_file.class_name().unwrap_or("<unresolved>")
    );
    println!(
        "Super:      {}",
        class_file.super_class_name().unwrap_or("<unresolved>")
    );
    println!("Interfaces: {}", class_file.interfaces.len());
    println!("Fields:     {}", class_file.fields.len());
    println!("Methods:    {}", class_file.methods.len());
    println!("Attributes: {}", class_file.attributes.0.len());
    if let Ok(Some(source_file)) = class_file.source_file() {
        println!("Source:     {}", source_file);
    }
}
