//! Python standard-library module sets, per language version

/// Newest version the tables know about; unparseable versions map here
pub const NEWEST: PythonVersion = PythonVersion::new(3, 13);

/// Top-level modules (private `_` modules included) shipped by every
/// supported Python 3 release, as listed by `sys.stdlib_module_names`
const BASE: &[&str] = &[
    "__future__", "__main__", "_abc", "_aix_support", "_ast", "_asyncio", "_bisect", "_blake2",
    "_bootsubprocess", "_bz2", "_codecs", "_codecs_cn", "_codecs_hk", "_codecs_iso2022",
    "_codecs_jp", "_codecs_kr", "_codecs_tw", "_collections", "_collections_abc", "_compat_pickle",
    "_compression", "_contextvars", "_csv", "_ctypes", "_curses", "_curses_panel", "_datetime",
    "_dbm", "_decimal", "_elementtree", "_frozen_importlib", "_frozen_importlib_external",
    "_functools", "_gdbm", "_hashlib", "_heapq", "_imp", "_io", "_json", "_locale", "_lsprof",
    "_lzma", "_markupbase", "_md5", "_multibytecodec", "_multiprocessing", "_opcode", "_operator",
    "_osx_support", "_overlapped", "_pickle", "_posixshmem", "_posixsubprocess", "_py_abc",
    "_pydecimal", "_pyio", "_queue", "_random", "_scproxy", "_sha1", "_sha256", "_sha3", "_sha512",
    "_signal", "_sitebuiltins", "_socket", "_sqlite3", "_sre", "_ssl", "_stat", "_statistics",
    "_string", "_strptime", "_struct", "_symtable", "_thread", "_threading_local", "_tkinter",
    "_tokenize", "_tracemalloc", "_typing", "_uuid", "_warnings", "_weakref", "_weakrefset",
    "_winapi", "abc", "antigravity", "argparse", "array", "ast", "asyncio", "atexit", "base64",
    "bdb", "binascii", "bisect", "builtins", "bz2", "calendar", "cmath", "cmd", "code", "codecs",
    "codeop", "collections", "colorsys", "compileall", "concurrent", "configparser", "contextlib",
    "contextvars", "copy", "copyreg", "cProfile", "csv", "ctypes", "curses", "dataclasses",
    "datetime", "dbm", "decimal", "difflib", "dis", "doctest", "email", "encodings", "ensurepip",
    "enum", "errno", "faulthandler", "fcntl", "filecmp", "fileinput", "fnmatch", "fractions",
    "ftplib", "functools", "gc", "genericpath", "getopt", "getpass", "gettext", "glob", "grp",
    "gzip", "hashlib", "heapq", "hmac", "html", "http", "idlelib", "imaplib", "importlib",
    "inspect", "io", "ipaddress", "itertools", "json", "keyword", "linecache", "locale", "logging",
    "lzma", "mailbox", "marshal", "math", "mimetypes", "mmap", "modulefinder", "msvcrt",
    "multiprocessing", "netrc", "nt", "ntpath", "nturl2path", "numbers", "opcode", "operator",
    "optparse", "os", "pathlib", "pdb", "pickle", "pickletools", "pkgutil", "platform", "plistlib",
    "poplib", "posix", "posixpath", "pprint", "profile", "pstats", "pty", "pwd", "py_compile",
    "pyclbr", "pydoc", "pydoc_data", "pyexpat", "queue", "quopri", "random", "re", "readline",
    "reprlib", "resource", "rlcompleter", "runpy", "sched", "secrets", "select", "selectors",
    "shelve", "shlex", "shutil", "signal", "site", "smtplib", "socket", "socketserver", "sqlite3",
    "sre_compile", "sre_constants", "sre_parse", "ssl", "stat", "statistics", "string",
    "stringprep", "struct", "subprocess", "symtable", "sys", "sysconfig", "syslog", "tabnanny",
    "tarfile", "tempfile", "termios", "textwrap", "this", "threading", "time", "timeit", "tkinter",
    "token", "tokenize", "trace", "traceback", "tracemalloc", "tty", "turtle", "turtledemo",
    "types", "typing", "unicodedata", "unittest", "urllib", "uuid", "venv", "warnings", "wave",
    "weakref", "webbrowser", "winreg", "winsound", "wsgiref", "xml", "xmlrpc", "zipapp", "zipfile",
    "zipimport", "zlib",
];

/// Modules that first shipped in a given release
const ADDED: &[(&str, PythonVersion)] = &[
    ("graphlib", PythonVersion::new(3, 9)),
    ("zoneinfo", PythonVersion::new(3, 9)),
    ("_zoneinfo", PythonVersion::new(3, 9)),
    ("tomllib", PythonVersion::new(3, 11)),
    ("_pydatetime", PythonVersion::new(3, 12)),
    ("_pylong", PythonVersion::new(3, 12)),
    ("_wmi", PythonVersion::new(3, 12)),
    ("_colorize", PythonVersion::new(3, 13)),
    ("_interpreters", PythonVersion::new(3, 13)),
    ("_pyrepl", PythonVersion::new(3, 13)),
];

/// Modules that stopped shipping in a given release
const REMOVED: &[(&[&str], PythonVersion)] = &[
    (REMOVED_IN_3_10, PythonVersion::new(3, 10)),
    (REMOVED_IN_3_11, PythonVersion::new(3, 11)),
    (REMOVED_IN_3_12, PythonVersion::new(3, 12)),
    (REMOVED_IN_3_13, PythonVersion::new(3, 13)),
];

const REMOVED_IN_3_10: &[&str] = &["_bootlocale", "formatter", "parser", "symbol"];

const REMOVED_IN_3_11: &[&str] = &["binhex"];

const REMOVED_IN_3_12: &[&str] = &["asynchat", "asyncore", "distutils", "imp", "smtpd"];

/// PEP 594 plus lib2to3
const REMOVED_IN_3_13: &[&str] = &[
    "_crypt", "_msi", "aifc", "audioop", "cgi", "cgitb", "chunk", "crypt", "imghdr", "lib2to3",
    "mailcap", "msilib", "nis", "nntplib", "ossaudiodev", "pipes", "sndhdr", "spwd", "sunau",
    "telnetlib", "uu", "xdrlib",
];

/// `major.minor` language version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PythonVersion {
    pub major: u32,
    pub minor: u32,
}

impl PythonVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse `3.12`, `3.12.1`, `python3.11` or `py3.10`; anything else is
    /// [`NEWEST`]
    pub fn parse_or_newest(version: &str) -> Self {
        Self::parse(version).unwrap_or(NEWEST)
    }

    fn parse(version: &str) -> Option<Self> {
        let digits = version.trim().trim_start_matches(|c: char| c.is_ascii_alphabetic());
        let mut parts = digits.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        Some(Self { major, minor })
    }
}

/// Whether `module` (a top-level name) belongs to the standard library of `version`
pub fn is_stdlib_module(module: &str, version: PythonVersion) -> bool {
    if BASE.contains(&module) {
        return true;
    }
    if let Some((_, since)) = ADDED.iter().find(|(name, _)| *name == module) {
        return version >= *since;
    }
    REMOVED
        .iter()
        .find(|(names, _)| names.contains(&module))
        .is_some_and(|(_, removed_in)| version < *removed_in)
}
