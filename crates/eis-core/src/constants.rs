/// First reference basis vector (x axis), 26 components.
pub const V1: [f64; 26] = [
    2.48751215e-1,
    2.15875225e-1,
    1.62470213e-1,
    7.96967445e-2,
    9.89489029e-2,
    1.02489078e-1,
    6.74553019e-2,
    1.37467438e-2,
    -5.84632917e-1,
    -2.93333724e-1,
    -1.15920182e-1,
    -1.87480717e-1,
    -2.43927912e-1,
    9.08932694e-2,
    -1.24391927e-1,
    8.27489833e-2,
    -4.61898732e-2,
    -1.01541587e-1,
    -4.70836697e-2,
    -6.57604633e-2,
    -3.39321015e-1,
    -3.95237806e-2,
    -3.24136407e-1,
    -4.77177688e-2,
    1.36643475e-1,
    -7.43591294e-2,
];

/// Second reference basis vector (y axis), 26 components.
pub const V2: [f64; 26] = [
    3.47901301e-2,
    8.13111572e-3,
    -5.04446152e-2,
    9.92309082e-2,
    -1.62170325e-2,
    -2.27881716e-2,
    -1.86213407e-1,
    1.27475645e-1,
    -1.03194293e-1,
    6.64997597e-2,
    -2.84325056e-1,
    8.04900855e-1,
    -4.14805675e-1,
    1.5351099e-3,
    -6.22641693e-4,
    -4.47658049e-3,
    -2.37992383e-4,
    1.58290415e-3,
    -3.00970355e-2,
    3.76936683e-2,
    5.88603871e-3,
    3.24573385e-3,
    3.28038616e-2,
    1.15684983e-1,
    -1.97981641e-2,
    -3.91782407e-2,
];

/// Third reference basis vector (z axis), 26 components.
pub const V3: [f64; 26] = [
    1.35892043e-2,
    2.39336407e-2,
    -8.05175538e-3,
    -8.88807932e-2,
    -4.07313102e-2,
    1.56282287e-2,
    -3.3330049e-3,
    -1.77077519e-1,
    -3.24715157e-1,
    1.47263862e-1,
    1.90695166e-1,
    2.17946268e-1,
    4.82489767e-1,
    5.9130609e-3,
    -4.72642853e-3,
    1.42692063e-3,
    -3.05500851e-2,
    1.09115708e-1,
    -2.01253228e-1,
    2.75396471e-1,
    -2.59085802e-1,
    3.87471329e-1,
    4.67006609e-2,
    3.89098176e-1,
    7.5081548e-2,
    -9.21891933e-2,
];

/// Projected coordinates are clamped to [-CLAMP_RANGE, CLAMP_RANGE].
pub const CLAMP_RANGE: f64 = 5.0;

/// Distance below which a point is category A.
pub const NEAR_THRESHOLD: f64 = 0.5;

/// Distance at or above which a point is category C.
pub const FAR_THRESHOLD: f64 = 1.0;

/// How long newly observed records stay highlighted.
pub const HIGHLIGHT_WINDOW_MS: u64 = 3000;

/// Default poll interval for live series.
pub const POLL_INTERVAL_MS: u64 = 5000;

/// Default page size for the combination listing.
pub const ITEMS_PER_PAGE: usize = 30;
