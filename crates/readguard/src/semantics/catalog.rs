//! Well-known framework types.
//!
//! A single file never declares `System.IO.Stream`; it comes from the base
//! class library. The catalog describes the slice of the BCL the rule needs:
//! `Stream` and its common descendants, plus look-alikes such as `TextReader`
//! and `BinaryReader` whose `Read` also returns `int` but is not a stream read.
//!
//! Type names in the catalog are resolved like source text, relative to the
//! declaring type's namespace.

/// A method shape: name, return type text and accepted argument counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogMethod {
    /// Method name
    pub name: &'static str,
    /// Return type as C# source text
    pub returns: &'static str,
    /// Fewest arguments any overload accepts
    pub min_arity: usize,
    /// Most arguments any overload accepts
    pub max_arity: usize,
}

/// A framework type description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogType {
    /// Namespace path, outermost first
    pub namespace: &'static [&'static str],
    /// Simple name
    pub name: &'static str,
    /// Base class as C# source text
    pub base: Option<&'static str>,
    /// Methods, overloads folded into arity ranges
    pub methods: &'static [CatalogMethod],
    /// Properties as `(name, type text)`
    pub properties: &'static [(&'static str, &'static str)],
}

const fn method(
    name: &'static str,
    returns: &'static str,
    min_arity: usize,
    max_arity: usize,
) -> CatalogMethod {
    CatalogMethod {
        name,
        returns,
        min_arity,
        max_arity,
    }
}

const SYSTEM: &[&str] = &["System"];
const SYSTEM_IO: &[&str] = &["System", "IO"];
const SYSTEM_IO_COMPRESSION: &[&str] = &["System", "IO", "Compression"];
const SYSTEM_IO_PIPES: &[&str] = &["System", "IO", "Pipes"];
const SYSTEM_NET_SOCKETS: &[&str] = &["System", "Net", "Sockets"];
const SYSTEM_NET_SECURITY: &[&str] = &["System", "Net", "Security"];
const SYSTEM_SECURITY_CRYPTOGRAPHY: &[&str] = &["System", "Security", "Cryptography"];

/// `Read` overloads as overridden by concrete streams.
const STREAM_READ_OVERRIDES: &[CatalogMethod] = &[method("Read", "int", 1, 3)];

/// A concrete stream that overrides `Read` and derives from `System.IO.Stream`.
const fn derived_stream(namespace: &'static [&'static str], name: &'static str) -> CatalogType {
    CatalogType {
        namespace,
        name,
        base: Some("System.IO.Stream"),
        methods: STREAM_READ_OVERRIDES,
        properties: &[],
    }
}

/// Every type the catalog knows.
pub const WELL_KNOWN_TYPES: &[CatalogType] = &[
    CatalogType {
        namespace: SYSTEM_IO,
        name: "Stream",
        base: None,
        methods: &[
            method("Read", "int", 1, 3),
            method("ReadByte", "int", 0, 0),
            method("ReadAtLeast", "int", 2, 3),
            method("ReadExactly", "void", 1, 3),
            method("ReadAsync", "System.Threading.Tasks.ValueTask<int>", 1, 4),
            method("Write", "void", 1, 3),
            method("WriteByte", "void", 1, 1),
            method("WriteAsync", "System.Threading.Tasks.Task", 1, 4),
            method("Flush", "void", 0, 0),
            method("Seek", "long", 2, 2),
            method("SetLength", "void", 1, 1),
            method("CopyTo", "void", 1, 2),
            method("Close", "void", 0, 0),
            method("Dispose", "void", 0, 0),
        ],
        properties: &[
            ("Length", "long"),
            ("Position", "long"),
            ("CanRead", "bool"),
            ("CanSeek", "bool"),
        ],
    },
    CatalogType {
        namespace: SYSTEM_IO,
        name: "MemoryStream",
        base: Some("Stream"),
        methods: &[
            method("Read", "int", 1, 3),
            method("ToArray", "byte[]", 0, 0),
            method("GetBuffer", "byte[]", 0, 0),
            method("WriteTo", "void", 1, 1),
        ],
        properties: &[("Capacity", "int")],
    },
    CatalogType {
        namespace: SYSTEM_IO,
        name: "FileStream",
        base: Some("Stream"),
        methods: &[method("Read", "int", 1, 3), method("Lock", "void", 2, 2)],
        properties: &[("Name", "string")],
    },
    derived_stream(SYSTEM_IO, "BufferedStream"),
    derived_stream(SYSTEM_IO, "UnmanagedMemoryStream"),
    derived_stream(SYSTEM_IO_PIPES, "PipeStream"),
    derived_stream(SYSTEM_IO_COMPRESSION, "GZipStream"),
    derived_stream(SYSTEM_IO_COMPRESSION, "DeflateStream"),
    derived_stream(SYSTEM_IO_COMPRESSION, "BrotliStream"),
    derived_stream(SYSTEM_NET_SOCKETS, "NetworkStream"),
    derived_stream(SYSTEM_SECURITY_CRYPTOGRAPHY, "CryptoStream"),
    CatalogType {
        namespace: SYSTEM_NET_SECURITY,
        name: "AuthenticatedStream",
        base: Some("System.IO.Stream"),
        methods: &[],
        properties: &[("InnerStream", "System.IO.Stream")],
    },
    CatalogType {
        namespace: SYSTEM_NET_SECURITY,
        name: "SslStream",
        base: Some("AuthenticatedStream"),
        methods: STREAM_READ_OVERRIDES,
        properties: &[],
    },
    CatalogType {
        namespace: SYSTEM_IO,
        name: "TextReader",
        base: None,
        methods: &[
            method("Read", "int", 0, 3),
            method("ReadBlock", "int", 1, 3),
            method("Peek", "int", 0, 0),
            method("ReadLine", "string", 0, 0),
            method("ReadToEnd", "string", 0, 0),
        ],
        properties: &[],
    },
    CatalogType {
        namespace: SYSTEM_IO,
        name: "StreamReader",
        base: Some("TextReader"),
        methods: &[method("Read", "int", 0, 3)],
        properties: &[("BaseStream", "Stream"), ("EndOfStream", "bool")],
    },
    CatalogType {
        namespace: SYSTEM_IO,
        name: "StringReader",
        base: Some("TextReader"),
        methods: &[method("Read", "int", 0, 3)],
        properties: &[],
    },
    CatalogType {
        namespace: SYSTEM_IO,
        name: "BinaryReader",
        base: None,
        methods: &[
            method("Read", "int", 0, 3),
            method("ReadInt32", "int", 0, 0),
            method("ReadBytes", "byte[]", 1, 1),
        ],
        properties: &[("BaseStream", "Stream")],
    },
    CatalogType {
        namespace: SYSTEM_IO,
        name: "File",
        base: None,
        methods: &[
            method("OpenRead", "FileStream", 1, 1),
            method("Open", "FileStream", 2, 4),
            method("Create", "FileStream", 1, 3),
            method("OpenText", "StreamReader", 1, 1),
            method("ReadAllBytes", "byte[]", 1, 1),
        ],
        properties: &[],
    },
    CatalogType {
        namespace: SYSTEM,
        name: "Console",
        base: None,
        methods: &[
            method("Read", "int", 0, 0),
            method("ReadLine", "string", 0, 0),
            method("OpenStandardInput", "System.IO.Stream", 0, 1),
        ],
        properties: &[("In", "System.IO.TextReader")],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn qualified_names_are_unique() {
        let mut seen = HashSet::new();
        for ty in WELL_KNOWN_TYPES {
            let qualified = format!("{}.{}", ty.namespace.join("."), ty.name);
            assert!(seen.insert(qualified.clone()), "duplicate catalog entry {qualified}");
        }
    }

    #[test]
    fn arity_ranges_are_ordered() {
        for ty in WELL_KNOWN_TYPES {
            for m in ty.methods {
                assert!(
                    m.min_arity <= m.max_arity,
                    "{}.{} has inverted arity range",
                    ty.name,
                    m.name
                );
            }
        }
    }

    #[test]
    fn stream_is_the_root_of_the_stream_family() {
        let stream = WELL_KNOWN_TYPES
            .iter()
            .find(|t| t.name == "Stream")
            .expect("catalog has Stream");
        assert_eq!(stream.namespace, &["System", "IO"]);
        assert!(stream.base.is_none());
    }
}
