// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! dag-pb and UnixFS protobuf messages.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PbLink {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub hash: Option<Vec<u8>>,
    #[prost(string, optional, tag = "2")]
    pub name: Option<String>,
    #[prost(uint64, optional, tag = "3")]
    pub tsize: Option<u64>,
}

/// Fields are declared links first so encoding follows canonical dag-pb
/// order (`Links` before `Data`).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PbNode {
    #[prost(message, repeated, tag = "2")]
    pub links: Vec<PbLink>,
    #[prost(bytes = "vec", optional, tag = "1")]
    pub data: Option<Vec<u8>>,
}

/// UnixFS `Data` message stored in `PbNode::data`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UnixFsData {
    #[prost(int32, optional, tag = "1")]
    pub data_type: Option<i32>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub data: Option<Vec<u8>>,
    #[prost(uint64, optional, tag = "3")]
    pub filesize: Option<u64>,
    #[prost(uint64, repeated, tag = "4")]
    pub blocksizes: Vec<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Raw,
    Directory,
    File,
    Metadata,
    Symlink,
    HamtShard,
}

impl DataType {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Raw),
            1 => Some(Self::Directory),
            2 => Some(Self::File),
            3 => Some(Self::Metadata),
            4 => Some(Self::Symlink),
            5 => Some(Self::HamtShard),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Raw => 0,
            Self::Directory => 1,
            Self::File => 2,
            Self::Metadata => 3,
            Self::Symlink => 4,
            Self::HamtShard => 5,
        }
    }
}
