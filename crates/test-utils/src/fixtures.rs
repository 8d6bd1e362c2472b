//! Common test fixtures for regrid tests.
//!
//! Grid dimensions for the refinement cases the regridder is run on, kept
//! independent of the crate under test.

/// Common grid specifications for testing.
pub mod grid {
    /// Grid specification for testing.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct GridSpec {
        pub xsize: f64,
        pub ysize: f64,
        pub itot: usize,
        pub jtot: usize,
        pub ktot: usize,
    }

    /// 400 m test domain, 25.6 km square.
    pub const TEST_400M: GridSpec = GridSpec {
        xsize: 25_600.0,
        ysize: 25_600.0,
        itot: 64,
        jtot: 64,
        ktot: 128,
    };

    /// 200 m refinement of [`TEST_400M`].
    pub const TEST_200M: GridSpec = GridSpec {
        xsize: 25_600.0,
        ysize: 25_600.0,
        itot: 128,
        jtot: 128,
        ktot: 128,
    };

    /// Tiny grid for fast driver tests.
    pub const TINY: GridSpec = GridSpec {
        xsize: 800.0,
        ysize: 400.0,
        itot: 4,
        jtot: 2,
        ktot: 3,
    };

    /// 2x refinement of [`TINY`].
    pub const TINY_2X: GridSpec = GridSpec {
        xsize: 800.0,
        ysize: 400.0,
        itot: 8,
        jtot: 4,
        ktot: 3,
    };
}

/// Common timestamps (already scaled by the model's I/O time precision).
pub mod time {
    /// Restart time of the coarse run.
    pub const TIME_IN: u64 = 4320;

    /// Start time of the refined run.
    pub const TIME_OUT: u64 = 0;
}
