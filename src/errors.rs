use crate::xsi::KeyType;

error_chain! {
    foreign_links {
        Fmt(::std::fmt::Error);
        Io(::std::io::Error);
        Json(::json::Error);
        TimeFmt(::time::ParseError);
    }

    errors {
        DuplicateFrame(name: String) {
            description("duplicate frame name")
            display("duplicate frame {:?}", name)
        }
        KeySizeMismatch(key_type: KeyType, expected: usize, got: usize) {
            description("animation key vector has the wrong size")
            display("{:?} key needs a vector of size {}, got {}", key_type, expected, got)
        }
        InvalidKeyType(index: u32) {
            description("invalid animation key type")
            display("invalid animation key type {}", index)
        }
        BadSnapshot(msg: String) {
            description("malformed scene snapshot")
            display("malformed scene snapshot: {}", msg)
        }
    }
}

macro_rules! check {
    ($b:expr) => {
        if !$b {
            use $crate::errors::Error;
            use $crate::errors::ErrorKind;
            Err(Error::from_kind(ErrorKind::BadSnapshot(format!(
                "expected: {}",
                stringify!($b)
            ))))
        } else {
            Ok(())
        }
    };
}
